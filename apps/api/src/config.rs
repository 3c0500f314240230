use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Per-identity token budget.
    pub token_quota: u64,
    /// Hours between quota resets. 0 disables the window (lifetime quota).
    pub quota_window_hours: u64,
    /// Upper bound on the multipart request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            token_quota: std::env::var("TOKEN_QUOTA")
                .unwrap_or_else(|_| "10000".to_string())
                .parse::<u64>()
                .context("TOKEN_QUOTA must be a non-negative integer")?,
            quota_window_hours: std::env::var("QUOTA_WINDOW_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse::<u64>()
                .context("QUOTA_WINDOW_HOURS must be a non-negative integer")?,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (2 * 1024 * 1024).to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a non-negative integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
