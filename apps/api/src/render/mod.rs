//! Document rendering boundary.
//!
//! The pipeline never talks to a PDF engine directly; it hands assembled
//! markup and a style tier to a `DocumentRenderer` and gets back bytes plus a
//! page count. Production uses the HTTP render sidecar; tests use scripted
//! fakes.

pub mod markup;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::layout::StyleTier;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("render service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("render service returned invalid payload: {0}")]
    InvalidPayload(String),
}

/// A rendered PDF and its measured page count.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, markup: &str, tier: StyleTier) -> Result<RenderedDocument, RenderError>;
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
    stylesheet: &'a str,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    pdf_base64: String,
    page_count: u32,
}

/// Adapter for the HTML-to-PDF render sidecar.
#[derive(Clone)]
pub struct HttpRenderer {
    client: Client,
    base_url: String,
}

impl HttpRenderer {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }
}

#[async_trait]
impl DocumentRenderer for HttpRenderer {
    async fn render(&self, markup: &str, tier: StyleTier) -> Result<RenderedDocument, RenderError> {
        let response = self
            .client
            .post(format!("{}/render", self.base_url))
            .json(&RenderRequest {
                html: markup,
                stylesheet: tier.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RenderError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: RenderResponse = response.json().await?;
        let bytes = BASE64
            .decode(&body.pdf_base64)
            .map_err(|e| RenderError::InvalidPayload(e.to_string()))?;

        debug!(
            tier = tier.as_str(),
            pages = body.page_count,
            bytes = bytes.len(),
            "rendered document"
        );
        Ok(RenderedDocument {
            bytes,
            page_count: body.page_count,
        })
    }
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Mutex;

    use super::*;

    /// Returns scripted page counts in order and records the tier of each call.
    pub struct FakeRenderer {
        page_counts: Mutex<Vec<u32>>,
        tiers: Mutex<Vec<StyleTier>>,
    }

    impl FakeRenderer {
        pub fn new(page_counts: Vec<u32>) -> Self {
            Self {
                page_counts: Mutex::new(page_counts),
                tiers: Mutex::new(Vec::new()),
            }
        }

        pub fn tiers(&self) -> Vec<StyleTier> {
            self.tiers.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentRenderer for FakeRenderer {
        async fn render(
            &self,
            _markup: &str,
            tier: StyleTier,
        ) -> Result<RenderedDocument, RenderError> {
            self.tiers.lock().unwrap().push(tier);
            let mut counts = self.page_counts.lock().unwrap();
            if counts.is_empty() {
                return Err(RenderError::Service {
                    status: 500,
                    message: "no scripted page count left".to_string(),
                });
            }
            Ok(RenderedDocument {
                bytes: b"%PDF-1.7".to_vec(),
                page_count: counts.remove(0),
            })
        }
    }
}
