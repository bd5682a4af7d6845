use std::path::PathBuf;
use std::sync::Arc;

use paperqa::{FsArtifactStore, HttpDocIntel, OpenAi, QaPipeline};

use crate::config::Config;

/// The concrete pipeline this deployment runs.
pub type Pipeline = QaPipeline<FsArtifactStore, OpenAi, HttpDocIntel>;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Directory holding uploaded PDFs; figure images live in `output/`.
    pub data_dir: PathBuf,
    /// External base URL used when rewriting figure and file links.
    pub public_base_url: String,
}

impl AppState {
    /// Build the state from configuration.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let data_dir = PathBuf::from(&config.data_dir);
        tokio::fs::create_dir_all(data_dir.join("output")).await?;

        let store = FsArtifactStore::open(data_dir.clone()).await?;

        let mut ai = OpenAi::new(&config.openai_api_key);
        if let Some(base) = &config.openai_base_url {
            ai = ai.with_base_url(base);
        }
        if let Some(model) = &config.chat_model {
            ai = ai.with_model(model);
        }
        if let Some(model) = &config.embedding_model {
            ai = ai.with_embedding_model(model);
        }

        let docintel = HttpDocIntel::new(&config.docintel_endpoint, &config.docintel_key);

        Ok(Self {
            pipeline: Arc::new(QaPipeline::new(store, ai, docintel)),
            data_dir,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}
