use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::SubmitError;

pub const SCHEMA_VERSION: &str = "quickbrief.v1";

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl Envelope {
    pub fn result<T: Serialize>(op: &'static str, result: &T) -> Result<Self, serde_json::Error> {
        let res_val = serde_json::to_value(result)?;
        Ok(Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            ok: true,
            result: Some(res_val),
            error: None,
        })
    }

    pub fn failure(op: &'static str, error: &ErrorPayload) -> Self {
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            ok: false,
            result: None,
            error: Some(error.clone()),
        }
    }
}

/// Machine-readable form of a [`SubmitError`]; `message` is what the
/// banner would show, `raw` what the catalog matched against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    pub raw: String,
}

impl From<&SubmitError> for ErrorPayload {
    fn from(err: &SubmitError) -> Self {
        let kind = match err {
            SubmitError::InvalidInput => "invalid_input",
            SubmitError::Network(_) => "network",
            SubmitError::Timeout => "timeout",
            SubmitError::Server { .. } => "server",
            SubmitError::Decode(_) => "decode",
        };
        ErrorPayload {
            kind,
            status: err.status(),
            message: err.user_message(),
            raw: err.raw_message(),
        }
    }
}
