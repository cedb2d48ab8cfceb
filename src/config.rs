// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Charge la configuration depuis l'environnement (.env via dotenv) une
//   seule fois au démarrage. Les handlers la reçoivent via web::Data.
//
// Variables:
//   - DATABASE_URL (obligatoire)
//   - JWT_SECRET, GEMINI_API_KEY (optionnelles, warning si absentes)
//   - AI_CLASSIFIER_MODEL, AI_CHAT_MODEL, AI_TIMEOUT_SECS
//   - HOST, PORT, DB_AUTO_MIGRATE
//
// ============================================================================

use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";
const DEFAULT_AI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub gemini_api_key: Option<String>,
    pub classifier_model: String,
    pub chat_model: String,
    pub ai_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub auto_migrate: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la config à partir d'une fonction de lookup (testable sans toucher à l'env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("⚠️  JWT_SECRET not found in .env, using default (INSECURE)");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|v| !v.is_empty());
        if gemini_api_key.is_none() {
            tracing::warn!("⚠️  GEMINI_API_KEY not set: AI verification and chat will be unavailable");
        }

        let ai_timeout_secs = parse_or("AI_TIMEOUT_SECS", lookup("AI_TIMEOUT_SECS"), DEFAULT_AI_TIMEOUT_SECS)?;
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let auto_migrate = parse_or("DB_AUTO_MIGRATE", lookup("DB_AUTO_MIGRATE"), true)?;

        Ok(Self {
            database_url,
            jwt_secret,
            gemini_api_key,
            classifier_model: lookup("AI_CLASSIFIER_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            chat_model: lookup("AI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            auto_migrate,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/taka")])).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.ai_timeout, Duration::from_secs(20));
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert!(config.gemini_api_key.is_none());
        assert!(config.auto_migrate);
    }

    #[test]
    fn test_missing_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/taka"),
            ("PORT", "http"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "PORT", .. })));
    }
}
