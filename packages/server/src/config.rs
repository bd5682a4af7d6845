use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables.
///
/// Missing required credentials fail here, at startup; the process never
/// begins serving with a lazily-broken configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub public_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
    pub docintel_endpoint: String,
    pub docintel_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "5010".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        Ok(Self {
            port,
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            chat_model: env::var("CHAT_MODEL").ok(),
            embedding_model: env::var("EMBEDDING_MODEL").ok(),
            docintel_endpoint: env::var("DOCINTEL_ENDPOINT")
                .context("DOCINTEL_ENDPOINT must be set")?,
            docintel_key: env::var("DOCINTEL_KEY")
                .context("DOCINTEL_KEY must be set")?,
        })
    }
}
