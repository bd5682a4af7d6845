//! HTTP client for the document-intelligence gateway.
//!
//! The OCR service owns PDF parsing, page rendering, and figure
//! detection; this client only consumes its three endpoints. Requests
//! carry the subscription key header used by the hosted service.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{DocIntelError, DocIntelResult};
use crate::traits::DocIntel;
use crate::types::{Document, PageText, RawFigure};

/// Client for a document-intelligence gateway.
#[derive(Clone)]
pub struct HttpDocIntel {
    client: Client,
    endpoint: String,
    key: String,
}

impl HttpDocIntel {
    /// Create a client for the given endpoint and subscription key.
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> DocIntelResult<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}{}", self.endpoint, path))
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocIntelError::Request(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(DocIntelError::DocumentNotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DocIntelError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[derive(Deserialize)]
struct PageTextsResponse {
    pages: Vec<PageText>,
}

#[derive(Deserialize)]
struct FiguresResponse {
    figures: Vec<FigureEntry>,
}

#[derive(Deserialize)]
struct FigureEntry {
    caption: String,
    image: String, // base64
    path: String,
}

#[async_trait]
impl DocIntel for HttpDocIntel {
    async fn page_texts(&self, document: &Document) -> DocIntelResult<Vec<PageText>> {
        let response = self
            .post(
                "/page_texts",
                serde_json::json!({"filename": document.filename}),
            )
            .await?;
        let parsed: PageTextsResponse = response
            .json()
            .await
            .map_err(|e| DocIntelError::Request(e.to_string()))?;
        Ok(parsed.pages)
    }

    async fn page_image(&self, document: &Document, page: usize) -> DocIntelResult<Vec<u8>> {
        let response = self
            .post(
                "/page_image",
                serde_json::json!({"filename": document.filename, "page": page}),
            )
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DocIntelError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn figures(&self, document: &Document) -> DocIntelResult<Vec<RawFigure>> {
        let response = self
            .post(
                "/figures",
                serde_json::json!({"filename": document.filename}),
            )
            .await?;
        let parsed: FiguresResponse = response
            .json()
            .await
            .map_err(|e| DocIntelError::Request(e.to_string()))?;

        parsed
            .figures
            .into_iter()
            .map(|entry| {
                let image = base64::engine::general_purpose::STANDARD
                    .decode(&entry.image)
                    .map_err(|e| {
                        DocIntelError::Request(format!("bad figure image encoding: {e}"))
                    })?;
                Ok(RawFigure {
                    caption: entry.caption,
                    image,
                    path: entry.path,
                })
            })
            .collect()
    }
}
