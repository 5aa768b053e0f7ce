//! Relay configuration, built from environment variables.
//!
//! Everything is optional except the object store endpoint: absent SMTP
//! settings select the API transport, and an absent destination list
//! simply disables forwarding (every message is suppressed).

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::pipeline::FilterConfig;

/// Separator for the destination and content-ignore lists.
const LIST_SEPARATOR: char = ';';

/// SMTP transport settings. Present only when `RELAY_SMTP_HOST` is set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
}

/// Outbound email API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    pub token: Option<SecretString>,
}

/// Full relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base URL of the object store serving raw messages.
    pub store_endpoint: String,
    pub smtp: Option<SmtpConfig>,
    pub api: Option<ApiConfig>,
    pub filter: FilterConfig,
}

impl RelayConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_endpoint = std::env::var("RELAY_STORE_ENDPOINT").map_err(|_| {
            ConfigError::MissingRequired {
                key: "RELAY_STORE_ENDPOINT".into(),
                hint: "Set it to the base URL of the object store holding raw messages".into(),
            }
        })?;

        let smtp = match std::env::var("RELAY_SMTP_HOST") {
            Ok(host) => {
                let port: u16 = match std::env::var("RELAY_SMTP_PORT") {
                    Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                        key: "RELAY_SMTP_PORT".into(),
                        message: format!("{s:?} is not a valid port number"),
                    })?,
                    Err(_) => 587,
                };
                let user = std::env::var("RELAY_SMTP_USER").unwrap_or_default();
                let password = std::env::var("RELAY_SMTP_PASSWORD").unwrap_or_default();
                Some(SmtpConfig {
                    host,
                    port,
                    user,
                    password: SecretString::from(password),
                })
            }
            Err(_) => None,
        };

        let api = std::env::var("RELAY_API_ENDPOINT").ok().map(|endpoint| ApiConfig {
            endpoint,
            token: std::env::var("RELAY_API_TOKEN").ok().map(SecretString::from),
        });

        let filter = FilterConfig {
            subject: non_empty(std::env::var("RELAY_SUBJECT_FILTER").ok()),
            content: non_empty(std::env::var("RELAY_CONTENT_FILTER").ok()),
            content_ignore: split_list(&std::env::var("RELAY_CONTENT_IGNORE").unwrap_or_default()),
            destinations: split_list(&std::env::var("RELAY_DESTINATIONS").unwrap_or_default()),
            from_override: non_empty(std::env::var("RELAY_FROM").ok()),
        };

        Ok(Self {
            store_endpoint,
            smtp,
            api,
            filter,
        })
    }
}

/// Split a semicolon-separated list, trimming entries and dropping empties.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
