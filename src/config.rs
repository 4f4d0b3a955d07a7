// board-collab-service/src/config.rs
use crate::models::DEFAULT_INVITATION_TTL_DAYS;
use chrono::Duration;
use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:9090";
const DEFAULT_STORAGE_DIR: &str = "./storage";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub storage_dir: PathBuf,
    pub persist_state: bool,
    pub invitation_ttl: Duration,
    pub allowed_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            persist_state: false,
            invitation_ttl: Duration::days(DEFAULT_INVITATION_TTL_DAYS),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl AppConfig {
    // Reads `.env` (if present) and the process environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ttl_days = parse_or(&lookup, "INVITATION_TTL_DAYS", DEFAULT_INVITATION_TTL_DAYS);
        let invitation_ttl = if ttl_days > 0 {
            Duration::days(ttl_days)
        } else {
            warn!("INVITATION_TTL_DAYS must be positive, using {}", DEFAULT_INVITATION_TTL_DAYS);
            defaults.invitation_ttl
        };

        Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            storage_dir: lookup("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            persist_state: parse_or(&lookup, "PERSIST_STATE", defaults.persist_state),
            invitation_ttl,
            allowed_origin: lookup("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using {}", raw, key, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.bind_address, "127.0.0.1:9090");
        assert_eq!(config.invitation_ttl, Duration::days(7));
        assert!(!config.persist_state);
    }

    #[test]
    fn overrides_and_bad_values() {
        let config = config_from(&[
            ("BIND_ADDRESS", "0.0.0.0:8080"),
            ("PERSIST_STATE", "true"),
            ("INVITATION_TTL_DAYS", "abc"),
            ("STORAGE_DIR", "/tmp/boards"),
        ]);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert!(config.persist_state);
        assert_eq!(config.invitation_ttl, Duration::days(7));
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/boards"));

        let config = config_from(&[("INVITATION_TTL_DAYS", "0")]);
        assert_eq!(config.invitation_ttl, Duration::days(7));
    }
}
