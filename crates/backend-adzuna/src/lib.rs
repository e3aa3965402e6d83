//! Adzuna job-search source for opportunity records.
//!
//! Provides the `OpportunitySource` trait and its Adzuna implementation.
//! Records fetched here are handed to the ranker unchanged; the scoring
//! crates never perform I/O themselves.

use std::future::Future;
use std::time::Duration;

use fitscore_model::OpportunityRecord;
use serde::Deserialize;
use thiserror::Error;

/// Errors from opportunity source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source credentials not set")]
    MissingCredentials,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Trait for sources of opportunity records (Adzuna, fixtures, etc.)
pub trait OpportunitySource {
    /// Fetch records matching a free-text search phrase.
    fn fetch(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<OpportunityRecord>, SourceError>> + Send;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// Adzuna API configuration.
#[derive(Debug, Clone)]
pub struct AdzunaConfig {
    /// Base URL for the jobs API
    pub base_url: String,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
    /// Two-letter country code used in the search path
    pub country: String,
    pub page: u32,
    pub results_per_page: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AdzunaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.adzuna.com/v1/api/jobs".to_string(),
            app_id: None,
            app_key: None,
            country: "in".to_string(),
            page: 1,
            results_per_page: 20,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Default, Deserialize)]
struct AdzunaJob {
    title: Option<String>,
    company: Option<DisplayName>,
    location: Option<DisplayName>,
    description: Option<String>,
    redirect_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DisplayName {
    display_name: Option<String>,
}

impl From<AdzunaJob> for OpportunityRecord {
    fn from(job: AdzunaJob) -> Self {
        let display = |d: Option<DisplayName>| d.and_then(|d| d.display_name).unwrap_or_default();

        Self {
            title: job.title.unwrap_or_default(),
            company: display(job.company),
            location: display(job.location),
            description: job.description.unwrap_or_default(),
            url: job.redirect_url.unwrap_or_default(),
        }
    }
}

/// Adzuna job-search source.
pub struct AdzunaSource {
    config: AdzunaConfig,
    client: reqwest::Client,
}

impl AdzunaSource {
    /// Create a new Adzuna source.
    pub fn new(config: AdzunaConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/{}/search/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.country,
            self.config.page
        )
    }

    /// Query parameters for a search, newest listings first.
    fn query_params(&self, query: &str) -> Result<Vec<(&'static str, String)>, SourceError> {
        let (Some(app_id), Some(app_key)) = (&self.config.app_id, &self.config.app_key) else {
            return Err(SourceError::MissingCredentials);
        };

        Ok(vec![
            ("app_id", app_id.clone()),
            ("app_key", app_key.clone()),
            ("what", query.to_string()),
            ("results_per_page", self.config.results_per_page.to_string()),
            ("sort_by", "date".to_string()),
        ])
    }

    /// Parse an Adzuna search response into records.
    fn parse_response(response: serde_json::Value) -> Result<Vec<OpportunityRecord>, SourceError> {
        let parsed: SearchResponse =
            serde_json::from_value(response).map_err(|e| SourceError::ParseError(e.to_string()))?;

        Ok(parsed.results.into_iter().map(OpportunityRecord::from).collect())
    }
}

impl OpportunitySource for AdzunaSource {
    async fn fetch(&self, query: &str) -> Result<Vec<OpportunityRecord>, SourceError> {
        let params = self.query_params(query)?;
        let url = self.search_url();

        tracing::debug!(url = %url, query, "Fetching Adzuna listings");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        let records = Self::parse_response(json)?;
        tracing::info!(count = records.len(), "Adzuna listings fetched");

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "adzuna"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn configured() -> AdzunaConfig {
        AdzunaConfig {
            app_id: Some("id".to_string()),
            app_key: Some("key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_search_url() {
        let source = AdzunaSource::new(AdzunaConfig {
            base_url: "https://api.example/jobs/".to_string(),
            country: "gb".to_string(),
            page: 2,
            ..configured()
        })
        .unwrap();
        assert_eq!(source.search_url(), "https://api.example/jobs/gb/search/2");
    }

    #[test]
    fn test_query_params() {
        let source = AdzunaSource::new(configured()).unwrap();
        let params = source.query_params("data analyst").unwrap();
        assert!(params.contains(&("what", "data analyst".to_string())));
        assert!(params.contains(&("results_per_page", "20".to_string())));
        assert!(params.contains(&("sort_by", "date".to_string())));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let source = AdzunaSource::new(AdzunaConfig::default()).unwrap();
        assert!(matches!(
            source.fetch("product manager").await,
            Err(SourceError::MissingCredentials)
        ));
    }

    #[test]
    fn test_parse_response() {
        let json = serde_json::json!({
            "count": 2,
            "results": [
                {
                    "title": "Technical Support Engineer",
                    "company": {"display_name": "Acme"},
                    "location": {"display_name": "Bengaluru", "area": ["India"]},
                    "description": "Handle incident escalation",
                    "redirect_url": "https://adzuna.example/1"
                },
                {"title": "Support Analyst", "company": null}
            ]
        });

        let records = AdzunaSource::parse_response(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            OpportunityRecord::new("Technical Support Engineer", "Handle incident escalation")
                .with_company("Acme")
                .with_location("Bengaluru")
                .with_url("https://adzuna.example/1")
        );
        assert_eq!(records[1].company, "");
        assert_eq!(records[1].description, "");
    }

    #[test]
    fn test_parse_response_without_results() {
        assert!(AdzunaSource::parse_response(serde_json::json!({})).unwrap().is_empty());
        assert!(matches!(
            AdzunaSource::parse_response(serde_json::json!([1, 2])),
            Err(SourceError::ParseError(_))
        ));
    }
}
