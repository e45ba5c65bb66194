use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::{issue_token, SessionClaims};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(help = "User id to put in the token subject")]
    pub user_id: String,

    #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let secret = config
        .session
        .jwt_secret
        .as_deref()
        .context("SESSION_JWT_SECRET must be set to mint development tokens")?;

    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let mut claims = SessionClaims::new(args.user_id, hours);
    claims.iss = config.session.issuer.clone();
    claims.azp = config.session.authorized_parties.first().cloned();
    let token = issue_token(secret, &claims)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "sub": claims.sub, "exp": claims.exp })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
