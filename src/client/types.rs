use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

impl AnalyzeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Structured summary returned by `POST /analyze`. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_news: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bad_news: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_promises: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
}

/// Failure body; the backend may send any JSON (or none at all).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The `error` field, or the generic status line when it is missing or empty.
    pub fn message_or_status(&self, status: u16) -> String {
        match self.error.as_deref() {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => format!("HTTP error! status: {status}"),
        }
    }
}
