pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Daybook CLI - maintenance and local development helpers for the Daybook API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Mint a development session token signed with SESSION_JWT_SECRET")]
    Token {
        #[command(flatten)]
        args: commands::token::TokenArgs,
    },

    #[command(about = "Print a signed identity-provider webhook for local testing")]
    SignWebhook {
        #[command(flatten)]
        args: commands::webhook::SignWebhookArgs,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::Token { args } => commands::token::handle(args, config, output_format),
        Commands::SignWebhook { args } => commands::webhook::handle(args, config, output_format),
    }
}
