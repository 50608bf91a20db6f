use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::types::{AnalysisResponse, AnalyzeRequest, ApiErrorBody};
use super::AnalyzeTransport;
use crate::error::SubmitError;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const ANALYZE_PATH: &str = "analyze";

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzeClientConfig {
    pub base_url: String,
    /// `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl Default for AnalyzeClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl AnalyzeClientConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. A zero or unparsable timeout
    /// leaves the transport default in place.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(base) = var("QUICKBRIEF_BASE_URL") {
            if !base.trim().is_empty() {
                cfg.base_url = base.trim().to_string();
            }
        }
        if let Some(secs) = var("QUICKBRIEF_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok()) {
            if secs > 0 {
                cfg.timeout = Some(Duration::from_secs(secs));
            }
        }
        cfg
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), ANALYZE_PATH)
    }
}

/// `reqwest`-backed transport posting JSON to `{base_url}/analyze`.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    cfg: AnalyzeClientConfig,
}

impl HttpTransport {
    pub fn new(cfg: AnalyzeClientConfig) -> Result<Self, SubmitError> {
        let http = client_builder(&cfg).build().map_err(SubmitError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    pub fn with_http(http: HttpClient, cfg: AnalyzeClientConfig) -> Self {
        Self { http, cfg }
    }
}

fn client_builder(cfg: &AnalyzeClientConfig) -> reqwest::ClientBuilder {
    let builder = HttpClient::builder();
    match cfg.timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

#[async_trait]
impl AnalyzeTransport for HttpTransport {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResponse, SubmitError> {
        let response = self
            .http
            .post(self.cfg.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(SubmitError::from_reqwest)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(SubmitError::from_reqwest)?;

        if !status.is_success() {
            let body = serde_json::from_slice::<ApiErrorBody>(&bytes).unwrap_or_default();
            let code = status.as_u16();
            return Err(SubmitError::Server {
                status: code,
                message: body.message_or_status(code),
            });
        }

        serde_json::from_slice::<AnalysisResponse>(&bytes)
            .map_err(|err| SubmitError::Decode(err.to_string()))
    }
}
