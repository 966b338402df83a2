//! Warehouse connection settings.

use derive_getters::Getters;
use ragumami_error::{SchemaError, SchemaErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Settings for [`BigQueryMetadataClient`](crate::BigQueryMetadataClient).
///
/// # Examples
///
/// ```
/// use ragumami_schema::BigQueryConfig;
///
/// let config = BigQueryConfig::builder()
///     .project_id("team-analytics")
///     .dataset("umami")
///     .build()
///     .unwrap();
///
/// assert!(config.is_configured());
/// assert_eq!(config.location(), "europe-north1");
/// assert_eq!(
///     config.table_url("event"),
///     "https://bigquery.googleapis.com/bigquery/v2/projects/team-analytics/datasets/umami/tables/event"
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct BigQueryConfig {
    /// Project holding the dataset
    #[builder(default)]
    #[serde(default)]
    project_id: String,

    /// Dataset with the analytics tables
    #[builder(default)]
    #[serde(default)]
    dataset: String,

    /// Processing location for queries
    #[builder(default = "default_location()")]
    #[serde(default = "default_location")]
    location: String,

    /// Static bearer token; when absent the metadata server is asked
    #[builder(default)]
    #[serde(default)]
    access_token: Option<String>,

    /// REST API root
    #[builder(default = "DEFAULT_API_BASE_URL.to_string()")]
    #[serde(default = "default_api_base_url")]
    api_base_url: String,

    /// Token endpoint of the compute metadata server
    #[builder(default = "DEFAULT_METADATA_TOKEN_URL.to_string()")]
    #[serde(default = "default_metadata_token_url")]
    metadata_token_url: String,

    /// Budget for each metadata request, in milliseconds
    #[builder(default = "10_000")]
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,

    /// Overall budget for a query job to complete, in milliseconds
    #[builder(default = "60_000")]
    #[serde(default = "default_query_deadline_ms")]
    query_deadline_ms: u64,
}

impl std::fmt::Debug for BigQueryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("location", &self.location)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("metadata_token_url", &self.metadata_token_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("query_deadline_ms", &self.query_deadline_ms)
            .finish()
    }
}

fn default_location() -> String {
    "europe-north1".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_metadata_token_url() -> String {
    DEFAULT_METADATA_TOKEN_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_query_deadline_ms() -> u64 {
    60_000
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: String::new(),
            location: default_location(),
            access_token: None,
            api_base_url: default_api_base_url(),
            metadata_token_url: default_metadata_token_url(),
            request_timeout_ms: default_request_timeout_ms(),
            query_deadline_ms: default_query_deadline_ms(),
        }
    }
}

impl BigQueryConfig {
    /// Creates a new config builder.
    pub fn builder() -> BigQueryConfigBuilder {
        BigQueryConfigBuilder::default()
    }

    /// A live source can be built only when project and dataset are both set.
    pub fn is_configured(&self) -> bool {
        !self.project_id.trim().is_empty() && !self.dataset.trim().is_empty()
    }

    /// Request budget as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Overall query completion budget as a duration.
    pub fn query_deadline(&self) -> Duration {
        Duration::from_millis(self.query_deadline_ms)
    }

    /// Server-side wait sent as `timeoutMs` on query calls.
    ///
    /// Half the HTTP budget, so BigQuery answers `jobComplete: false` before
    /// the client gives up on the request.
    pub fn job_wait_ms(&self) -> u64 {
        (self.request_timeout_ms / 2).max(1)
    }

    fn root(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// `jobs.query` endpoint.
    pub fn query_url(&self) -> String {
        format!("{}/projects/{}/queries", self.root(), self.project_id)
    }

    /// `jobs.getQueryResults` endpoint.
    pub fn query_results_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.query_url(), job_id)
    }

    /// `datasets.get` endpoint.
    pub fn dataset_url(&self) -> String {
        format!(
            "{}/projects/{}/datasets/{}",
            self.root(),
            self.project_id,
            self.dataset
        )
    }

    /// `tables.list` endpoint.
    pub fn tables_url(&self) -> String {
        format!("{}/tables", self.dataset_url())
    }

    /// `tables.get` endpoint.
    pub fn table_url(&self, table_name: &str) -> String {
        format!("{}/{}", self.tables_url(), table_name)
    }

    /// Check the settings before a client is built from them.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !self.is_configured() {
            return Err(SchemaError::new(SchemaErrorKind::Configuration(
                "project_id and dataset must both be set".to_string(),
            )));
        }
        for url in [&self.api_base_url, &self.metadata_token_url] {
            reqwest::Url::parse(url).map_err(|e| {
                SchemaError::new(SchemaErrorKind::Configuration(format!(
                    "Invalid URL '{}': {}",
                    url, e
                )))
            })?;
        }
        if self.request_timeout_ms == 0 {
            return Err(SchemaError::new(SchemaErrorKind::Configuration(
                "request_timeout_ms must be greater than zero".to_string(),
            )));
        }
        if self.query_deadline_ms == 0 {
            return Err(SchemaError::new(SchemaErrorKind::Configuration(
                "query_deadline_ms must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}
