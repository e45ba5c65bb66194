use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub webhook: WebhookConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

/// Session token verification settings. Exactly one of `jwt_public_key`
/// (RS256, identity provider) or `jwt_secret` (HS256) is used; the public key
/// wins when both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<String>,
    pub issuer: Option<String>,
    pub authorized_parties: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub secret: Option<String>,
    pub tolerance_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("DAYBOOK_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" | "postgresql" => StoreBackend::Postgres,
                _ => self.database.backend,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = non_empty(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_JWT_SECRET") {
            self.session.jwt_secret = non_empty(v);
        }
        if let Ok(v) = env::var("SESSION_JWT_PUBLIC_KEY") {
            // PEM keys are often stored on one line with literal \n separators
            self.session.jwt_public_key = non_empty(v.replace("\\n", "\n"));
        }
        if let Ok(v) = env::var("SESSION_JWT_ISSUER") {
            self.session.issuer = non_empty(v);
        }
        if let Ok(v) = env::var("SESSION_AUTHORIZED_PARTIES") {
            self.session.authorized_parties = split_list(&v);
        }

        // Webhook overrides
        if let Ok(v) = env::var("WEBHOOK_SECRET") {
            self.webhook.secret = non_empty(v);
        }
        if let Ok(v) = env::var("WEBHOOK_TOLERANCE_SECS") {
            self.webhook.tolerance_secs = v.parse().unwrap_or(self.webhook.tolerance_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            session: SessionConfig::default(),
            webhook: WebhookConfig {
                secret: None,
                tolerance_secs: 5 * 60,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            session: SessionConfig::default(),
            webhook: WebhookConfig {
                secret: None,
                tolerance_secs: 5 * 60,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_expiry_hours: 24,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            session: SessionConfig::default(),
            webhook: WebhookConfig {
                secret: None,
                tolerance_secs: 5 * 60,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_expiry_hours: 1,
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert!(config.database.run_migrations);
        assert_eq!(config.webhook.tolerance_secs, 300);
        assert!(config.session.jwt_secret.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.database.run_migrations);
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(" whsec_abc ".to_string()), Some("whsec_abc".to_string()));
    }
}
