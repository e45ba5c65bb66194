use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::webhooks::WebhookVerifier;

#[derive(Args)]
pub struct SignWebhookArgs {
    #[arg(help = "Event type, e.g. user.created or user.deleted")]
    pub event_type: String,

    #[arg(help = "User id placed in data.id")]
    pub user_id: String,

    #[arg(long, help = "Message id (random when omitted)")]
    pub msg_id: Option<String>,
}

pub fn handle(
    args: SignWebhookArgs,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let secret = config
        .webhook
        .secret
        .as_deref()
        .context("WEBHOOK_SECRET must be set to sign webhooks")?;
    let verifier = WebhookVerifier::new(secret, config.webhook.tolerance_secs)?;

    let msg_id = args
        .msg_id
        .unwrap_or_else(|| format!("msg_{}", uuid::Uuid::new_v4().simple()));
    let timestamp = chrono::Utc::now().timestamp();
    let body = json!({
        "object": "event",
        "type": args.event_type,
        "data": { "id": args.user_id },
    })
    .to_string();
    let signature = verifier.sign(&msg_id, timestamp, body.as_bytes())?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "headers": {
                    "svix-id": msg_id,
                    "svix-timestamp": timestamp.to_string(),
                    "svix-signature": signature,
                },
                "body": body,
            })
        ),
        OutputFormat::Text => {
            println!("svix-id: {}", msg_id);
            println!("svix-timestamp: {}", timestamp);
            println!("svix-signature: {}", signature);
            println!();
            println!("{}", body);
        }
    }
    Ok(())
}
