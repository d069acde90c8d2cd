use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "it's a secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the
    /// process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").unwrap_or_default();
        if database_url.trim().is_empty() {
            bail!("DATABASE_URL is unset");
        }

        let secret_key = get("SECRET_KEY").unwrap_or_default();
        if secret_key.is_empty() || PLACEHOLDER_SECRETS.contains(&secret_key.as_str()) {
            bail!("SECRET_KEY is unset or still a placeholder");
        }

        let host = get("WARBLER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("WARBLER_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("WARBLER_PORT is not a valid port")?;
        let static_dir: PathBuf = get("WARBLER_STATIC_DIR")
            .unwrap_or_else(|| "static".into())
            .into();

        Ok(Self {
            database_url,
            secret_key,
            host,
            port,
            static_dir,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
