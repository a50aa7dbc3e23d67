use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; a present but unparseable value is a startup error.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub store_lock_timeout: Duration,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
            store_lock_timeout: Duration::from_millis(5000),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            upload_dir: env_or("UPLOAD_DIR", defaults.upload_dir)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            store_lock_timeout: Duration::from_millis(env_or(
                "STORE_LOCK_TIMEOUT_MS",
                defaults.store_lock_timeout.as_millis() as u64,
            )?),
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_default_when_unset() {
        let port: u16 = env_or("CANDIDATES_API_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_env_or_rejects_garbage() {
        std::env::set_var("CANDIDATES_API_TEST_BAD_PORT", "eighty");
        let err = env_or::<u16>("CANDIDATES_API_TEST_BAD_PORT", 8080).unwrap_err();
        assert!(err.to_string().contains("CANDIDATES_API_TEST_BAD_PORT"));
    }

    #[test]
    fn test_env_or_parses_value() {
        std::env::set_var("CANDIDATES_API_TEST_MAX_UPLOAD", "1024");
        let max: usize = env_or("CANDIDATES_API_TEST_MAX_UPLOAD", 0).unwrap();
        assert_eq!(max, 1024);
    }
}
