// src/services/health_plan_client.rs
use async_trait::async_trait;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, ConfigError};
use crate::services::intake::{FormatChoice, IntakeProfile};

const GENERATE_PATH: &str = "generate_health_plan";
const QUERY_PATH: &str = "query";

/// Failures of a single backend call. None of them are retried.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid API URL")]
    InvalidUrl,

    #[error("Failed to encode request: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No data received from server")]
    NoData,

    #[error("Error processing server response: {0}")]
    Decoding(String),
}

/// Body of `POST /generate_health_plan`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthPlanRequest {
    pub query: String,
    pub health_metrics: IntakeProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_type: Option<FormatChoice>,
}

impl HealthPlanRequest {
    pub fn new(query: impl Into<String>, health_metrics: IntakeProfile) -> Self {
        Self {
            query: query.into(),
            health_metrics,
            format_type: None,
        }
    }

    pub fn with_format(mut self, format: FormatChoice) -> Self {
        self.format_type = Some(format);
        self
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// The remote plan service as seen by a chat session.
#[async_trait]
pub trait HealthPlanBackend: Send + Sync {
    /// `POST /generate_health_plan`, returning the `response` field.
    async fn generate_health_plan(&self, request: &HealthPlanRequest) -> Result<String, BackendError>;

    /// `POST /query`, returning the `answer` field.
    async fn query(&self, question: &str) -> Result<String, BackendError>;
}

#[derive(Debug, Clone)]
pub struct HealthPlanClient {
    client: Client,
    base_url: String,
}

impl HealthPlanClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|_| BackendError::InvalidUrl)
    }

    /// POSTs `payload` as JSON to `path` and extracts the string at `field`.
    async fn post_for_field<T>(&self, path: &str, payload: &T, field: &str) -> Result<String, BackendError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(path)?;
        let body = serde_json::to_vec(payload).map_err(BackendError::Serialization)?;
        debug!(%url, bytes = body.len(), "posting to plan service");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            warn!(%status, path, "plan service returned an empty body");
            return Err(BackendError::NoData);
        }

        let json: Value =
            serde_json::from_slice(&bytes).map_err(|e| BackendError::Decoding(format!("status {status}: {e}")))?;

        json.get(field)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| BackendError::Decoding(format!("status {status}: missing string field '{field}'")))
    }
}

#[async_trait]
impl HealthPlanBackend for HealthPlanClient {
    async fn generate_health_plan(&self, request: &HealthPlanRequest) -> Result<String, BackendError> {
        self.post_for_field(GENERATE_PATH, request, "response").await
    }

    async fn query(&self, question: &str) -> Result<String, BackendError> {
        self.post_for_field(QUERY_PATH, &QueryRequest { query: question }, "answer")
            .await
    }
}
