//! Workday job-board client.
//!
//! Standalone collaborator used to discover postings worth running the
//! generation pipeline on; the orchestrator itself never calls it.

pub mod handlers;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

const PAGE_SIZE: u32 = 20;
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Error)]
pub enum JobBoardError {
    #[error("failed to fetch jobs from Workday for {company}: {source}")]
    Request {
        company: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Per-company Workday tenant configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    pub company: String,
    pub base_url: String,
    pub tenant: String,
    pub site: String,
    /// Named Workday location facet ids.
    #[serde(default)]
    pub location_filters: Vec<String>,
}

/// A normalized job posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Posting {
    pub company: String,
    pub title: String,
    pub location: String,
    pub url_path: String,
    pub posted_on: String,
    pub external_id: String,
}

#[derive(Debug, Serialize)]
struct PageRequest<'a> {
    #[serde(rename = "appliedFacets")]
    applied_facets: Value,
    limit: u32,
    offset: u32,
    #[serde(rename = "searchText")]
    search_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(rename = "jobPostings", default)]
    job_postings: Vec<Value>,
    #[serde(default)]
    total: u32,
}

pub struct WorkdayClient {
    client: Client,
    config: BoardConfig,
    jobs_url: String,
}

impl WorkdayClient {
    pub fn new(config: BoardConfig) -> Self {
        let jobs_url = format!(
            "{}/wday/cxs/{}/{}/jobs",
            config.base_url.trim_end_matches('/'),
            config.tenant,
            config.site
        );
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(20))
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
            config,
            jobs_url,
        }
    }

    /// Fetches postings matching `keywords`, paginating until the server runs
    /// out or `max_results` is reached.
    pub async fn fetch(
        &self,
        keywords: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<Posting>, JobBoardError> {
        let mut offset = 0;
        let mut total_available: Option<u32> = None;
        let mut postings = Vec::new();

        loop {
            let page = self.fetch_page(keywords.unwrap_or(""), offset).await?;
            if offset == 0 {
                total_available = Some(page.total);
            }
            if page.job_postings.is_empty() {
                break;
            }

            for raw in &page.job_postings {
                postings.push(self.normalize(raw));
            }

            if let Some(max) = max_results {
                if postings.len() >= max {
                    postings.truncate(max);
                    break;
                }
            }

            offset += PAGE_SIZE;
            if matches!(total_available, Some(total) if offset >= total) {
                break;
            }
        }

        Ok(postings)
    }

    async fn fetch_page(&self, keywords: &str, offset: u32) -> Result<PageResponse, JobBoardError> {
        let mut facets = serde_json::Map::new();
        if !self.config.location_filters.is_empty() {
            facets.insert(
                "locations".to_string(),
                Value::from(self.config.location_filters.clone()),
            );
        }

        let request = PageRequest {
            applied_facets: Value::Object(facets),
            limit: PAGE_SIZE,
            offset,
            search_text: keywords,
        };

        let result = async {
            self.client
                .post(&self.jobs_url)
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<PageResponse>()
                .await
        }
        .await;

        result.map_err(|e| {
            error!(company = %self.config.company, error = %e, "Workday API request failed");
            JobBoardError::Request {
                company: self.config.company.clone(),
                source: e,
            }
        })
    }

    /// The external id comes from the first bullet field, falling back to the
    /// last path segment.
    fn normalize(&self, raw: &Value) -> Posting {
        let url_path = str_field(raw, "externalPath");
        let external_id = raw
            .get("bulletFields")
            .and_then(|v| v.as_array())
            .and_then(|fields| fields.first())
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                url_path.rsplit('/').next().unwrap_or_default().to_string()
            });

        Posting {
            company: self.config.company.clone(),
            title: str_field(raw, "title"),
            location: str_field(raw, "locationsText"),
            url_path,
            posted_on: str_field(raw, "postedOn"),
            external_id,
        }
    }
}

fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
