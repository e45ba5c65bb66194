use anyhow::Context;
use std::sync::Arc;

use crate::auth::SessionVerifier;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, Store};
use crate::webhooks::WebhookVerifier;

/// Per-process handles shared by every request. Nothing in here is mutated
/// after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionVerifier>,
    /// `None` when no signing secret is configured; every webhook is then rejected
    pub webhooks: Option<Arc<WebhookVerifier>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        sessions: SessionVerifier,
        webhooks: Option<WebhookVerifier>,
    ) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
            webhooks: webhooks.map(Arc::new),
        }
    }

    /// Open the configured store and build the verifiers
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let sessions = SessionVerifier::from_config(&config.session)
            .context("failed to configure session verification")?;

        let webhooks = match &config.webhook.secret {
            Some(secret) => Some(
                WebhookVerifier::new(secret, config.webhook.tolerance_secs)
                    .context("failed to configure webhook verification")?,
            ),
            None => {
                tracing::warn!("WEBHOOK_SECRET not set; identity-provider webhooks will be rejected");
                None
            }
        };

        let store = DatabaseManager::open(&config.database)
            .await
            .context("failed to open store")?;

        Ok(Self::new(store, sessions, webhooks))
    }
}
