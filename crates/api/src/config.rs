//! Process configuration, read once at startup.

use doorkeep_core::Environment;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Values the server needs from the process environment. Everything
/// downstream receives explicit values; nothing re-reads env vars later.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database_url: Option<String>,
    pub listen_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match std::env::var("APP_ENV") {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!(%err, "invalid APP_ENV; defaulting to development");
                Environment::Development
            }),
            Err(_) => {
                tracing::warn!("APP_ENV not set; defaulting to development");
                Environment::Development
            }
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        let listen_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned());

        Self {
            environment,
            database_url,
            listen_addr,
        }
    }
}
