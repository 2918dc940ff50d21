use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    /// Base URL of the HTML-to-PDF render sidecar.
    pub renderer_url: String,
    /// Directory generated PDFs are written to.
    pub output_dir: String,
    /// Directory job-description files are read from. API callers may only
    /// name files inside it.
    pub jd_dir: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            renderer_url: require_env("RENDERER_URL")?,
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "output/resumes".to_string()),
            jd_dir: std::env::var("JD_DIR").unwrap_or_else(|_| "input/jds".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
