//! Shamela search: one form POST to the ajax endpoint, then result extraction.

pub mod extractor;

pub use extractor::{ExtractOptions, PreviewScope, SearchResult, TextJoin, extract_results};

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct ShamelaClient {
    http: Client,
    search_url: Url,
}

impl ShamelaClient {
    pub fn new(http: Client, search_url: Url) -> Self {
        Self { http, search_url }
    }

    /// Send the search form and return the raw HTML fragment.
    ///
    /// Any non-200 status yields an empty body rather than an error, so an
    /// upstream failure reads the same as "no hits" downstream.
    pub async fn send_search_request(&self, term: &str) -> Result<String, SearchError> {
        let response = self
            .http
            .post(self.search_url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(USER_AGENT, crate::USER_AGENT)
            .form(&[("term", term)])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(status = %status, "search endpoint returned non-success, treating as empty");
            return Ok(String::new());
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "search response received");
        Ok(body)
    }

    /// Fetch and extract in one step. Transport failures are logged and
    /// come back as an empty result list.
    pub async fn search(&self, term: &str, options: ExtractOptions) -> Vec<SearchResult> {
        match self.send_search_request(term).await {
            Ok(body) => extract_results(&body, options),
            Err(e) => {
                warn!(error = %e, "search failed");
                Vec::new()
            }
        }
    }
}
