use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Remote rasterization endpoint. Unset means static export always falls back to HTML5.
    pub rasterizer_url: Option<String>,
    pub rasterizer_timeout_secs: u64,
    /// Upper bound on sizes × palettes in one batch request.
    pub max_batch_items: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rasterizer_url: std::env::var("RASTERIZER_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            rasterizer_timeout_secs: parse_env("RASTERIZER_TIMEOUT_SECS", 30)
                .context("RASTERIZER_TIMEOUT_SECS must be a whole number of seconds")?,
            max_batch_items: parse_env("MAX_BATCH_ITEMS", 64)
                .context("MAX_BATCH_ITEMS must be a positive integer")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            rasterizer_url: None,
            rasterizer_timeout_secs: 30,
            max_batch_items: 64,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value {raw:?} for '{key}'")),
        Err(_) => Ok(default),
    }
}
