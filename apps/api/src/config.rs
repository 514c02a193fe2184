use anyhow::{ensure, Context, Result};

use crate::llm_client::DEFAULT_API_URL;

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Full `generateContent` endpoint of the text-generation provider.
    pub gemini_api_url: String,
    pub llm_timeout_secs: u64,
    pub session_ttl_hours: i64,
    /// Adds the `Secure` attribute to the session cookie. Enable behind HTTPS.
    pub cookie_secure: bool,
    /// When set, CORS only admits this origin (with credentials).
    pub frontend_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            session_ttl_hours: check_session_ttl(parse_env("SESSION_TTL_HOURS", 24)?)?,
            cookie_secure: parse_env("COOKIE_SECURE", false)?,
            frontend_origin: std::env::var("FRONTEND_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
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
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

fn check_session_ttl(hours: i64) -> Result<i64> {
    ensure!(
        (1..=MAX_SESSION_TTL_HOURS).contains(&hours),
        "SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
    );
    Ok(hours)
}
