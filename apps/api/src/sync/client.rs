//! HTTP client for the external internship listings feed.
//!
//! The feed is a single GET returning a JSON array of listings. Rate limits and
//! server errors are retried with exponential backoff; any other non-2xx status
//! fails the run immediately.
//!
//! The same client reads each posting's page for its description text during
//! sync. Those reads never fail the run; an unreadable page is reported as `None`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::job::Listing;

const USER_AGENT: &str = "InternshipTracker/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RETRIES: u32 = 3;

/// Per-page budget for description reads.
const DESCRIPTION_TIMEOUT: Duration = Duration::from_secs(10);
const TEXT_WIDTH: usize = 120;

#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<ListingsError> for AppError {
    fn from(e: ListingsError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

#[derive(Clone)]
pub struct ListingsClient {
    client: Client,
    url: String,
}

impl ListingsClient {
    pub fn new(url: &str) -> Result<Self, ListingsError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the full feed.
    pub async fn fetch(&self) -> Result<Vec<Listing>, ListingsError> {
        let mut last_error: Option<ListingsError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Listings fetch attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(&self.url).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ListingsError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Listings feed returned {}: {}", status, body);
                last_error = Some(ListingsError::Status {
                    status: status.as_u16(),
                    body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ListingsError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let listings: Vec<Listing> = response.json().await?;
            debug!(count = listings.len(), url = %self.url, "Fetched listings feed");
            return Ok(listings);
        }

        Err(last_error.unwrap_or(ListingsError::Status {
            status: 0,
            body: "no attempts made".to_string(),
        }))
    }
}

/// Where sync reads a posting's description from.
#[async_trait]
pub trait DescriptionSource: Send + Sync {
    /// Plain description text for the page at `url`, or `None` when it cannot be read.
    async fn description(&self, url: &str) -> Option<String>;
}

#[async_trait]
impl DescriptionSource for ListingsClient {
    async fn description(&self, url: &str) -> Option<String> {
        if url.trim().is_empty() {
            return None;
        }

        let response = match self
            .client
            .get(url)
            .timeout(DESCRIPTION_TIMEOUT)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!(status = %r.status(), url, "Description page unavailable");
                return None;
            }
            Err(e) => {
                debug!(url, "Description fetch failed: {e}");
                return None;
            }
        };

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.contains("html"));
        let body = response.text().await.ok()?;

        let text = if is_html { html_to_text(&body)? } else { body };
        let text = collapse_whitespace(&text);
        (!text.is_empty()).then_some(text)
    }
}

fn html_to_text(html: &str) -> Option<String> {
    match html2text::from_read(html.as_bytes(), TEXT_WIDTH) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("Could not render description HTML: {e}");
            None
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
