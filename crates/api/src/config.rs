use std::env;
use std::str::FromStr;

use buurt_core::auth::Credentials;
use buurt_core::store::HttpStoreConfig;

/// Where content documents live.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Process memory; contents are lost on restart.
    Memory,
    Postgres {
        url: String,
        max_connections: u32,
        min_connections: u32,
    },
    Hosted(HttpStoreConfig),
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Without a key, mail is logged instead of sent.
    pub resend_api_key: Option<String>,
    pub contact_to: String,
    pub contact_from: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    /// Image CDN project and dataset; shared with the hosted store.
    pub project_id: String,
    pub dataset: String,
    pub jwt_secret: String,
    /// Studio login is disabled when no password hash is configured.
    pub studio: Option<Credentials>,
    pub mail: MailConfig,
    pub max_body_bytes: usize,
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set when {1} is set")]
    Missing(&'static str, &'static str),
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let project_id = lookup("SANITY_PROJECT_ID").unwrap_or_default();
        let dataset = var("SANITY_DATASET", "production");

        let store = if let Some(url) = lookup("DATABASE_URL") {
            StoreBackend::Postgres {
                url,
                max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 20, "u32")?,
                min_connections: parse(&lookup, "DB_MIN_CONNECTIONS", 1, "u32")?,
            }
        } else if !project_id.is_empty() {
            StoreBackend::Hosted(HttpStoreConfig {
                project_id: project_id.clone(),
                dataset: dataset.clone(),
                api_version: var("SANITY_API_VERSION", "2024-01-01"),
                token: lookup("SANITY_TOKEN"),
            })
        } else {
            StoreBackend::Memory
        };

        let studio = match lookup("STUDIO_PASSWORD_HASH") {
            Some(password_hash) => Some(Credentials {
                username: var("STUDIO_USERNAME", "redactie"),
                password_hash,
            }),
            None if lookup("STUDIO_USERNAME").is_some() => {
                return Err(ConfigError::Missing("STUDIO_PASSWORD_HASH", "STUDIO_USERNAME"));
            }
            None => None,
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse(&lookup, "PORT", 3030, "u16")?,
            store,
            project_id,
            dataset,
            jwt_secret: var("JWT_SECRET", "dev-secret-change-me-in-production"),
            studio,
            mail: MailConfig {
                resend_api_key: lookup("RESEND_API_KEY"),
                contact_to: var("CONTACT_TO", "info@buurtvereniging.nl"),
                contact_from: var("CONTACT_FROM", "Buurtvereniging <noreply@buurtvereniging.nl>"),
            },
            max_body_bytes: parse(&lookup, "MAX_BODY_BYTES", 1024 * 1024, "usize")?,
            log_level: var("LOG_LEVEL", "info"),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_memory_store() {
        let config = config(&[]).unwrap();
        assert!(matches!(config.store, StoreBackend::Memory));
        assert_eq!(config.addr(), "0.0.0.0:3030");
        assert!(config.studio.is_none());
        assert!(config.mail.resend_api_key.is_none());
    }

    #[test]
    fn database_url_wins_over_hosted() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/buurt"),
            ("SANITY_PROJECT_ID", "abc123"),
        ])
        .unwrap();
        assert!(matches!(config.store, StoreBackend::Postgres { .. }));
        assert_eq!(config.project_id, "abc123");
    }

    #[test]
    fn hosted_store_from_project_id() {
        let config = config(&[("SANITY_PROJECT_ID", "abc123"), ("SANITY_TOKEN", "t")]).unwrap();
        match config.store {
            StoreBackend::Hosted(hosted) => {
                assert_eq!(hosted.dataset, "production");
                assert_eq!(hosted.token.as_deref(), Some("t"));
            }
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = config(&[("PORT", "negentig")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn studio_username_needs_hash() {
        assert!(matches!(
            config(&[("STUDIO_USERNAME", "redactie")]),
            Err(ConfigError::Missing(..))
        ));
    }
}
