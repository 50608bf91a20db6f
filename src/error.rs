use crate::messages;

/// Why a submission did not produce a result.
///
/// Every variant is terminal for the submission that raised it; the
/// controller never retries and always returns to a ready state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Rejected locally; no request was issued.
    InvalidInput,
    /// Connectivity, DNS or connection reset.
    Network(String),
    /// The configured client timeout elapsed.
    Timeout,
    /// The backend answered outside 200-299.
    Server { status: u16, message: String },
    /// A success status with a body that is not an analysis object.
    Decode(String),
}

impl SubmitError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SubmitError::Timeout
        } else {
            SubmitError::Network(err.to_string())
        }
    }

    /// Text fed to the keyword catalog in [`messages::friendly_error`].
    ///
    /// Transport failures carry the wording that selects their catalog row.
    pub fn raw_message(&self) -> String {
        match self {
            SubmitError::InvalidInput => messages::INVALID_URL.to_string(),
            SubmitError::Network(detail) => format!("Failed to fetch: {detail}"),
            SubmitError::Timeout => "request timeout".to_string(),
            SubmitError::Server { message, .. } => message.clone(),
            SubmitError::Decode(detail) => format!("invalid response body: {detail}"),
        }
    }

    /// Message shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::InvalidInput => messages::INVALID_URL.to_string(),
            other => messages::friendly_error(&other.raw_message()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::InvalidInput => write!(f, "invalid url"),
            SubmitError::Network(detail) => write!(f, "network error: {detail}"),
            SubmitError::Timeout => write!(f, "request timed out"),
            SubmitError::Server { status, message } => {
                write!(f, "server error {status}: {message}")
            }
            SubmitError::Decode(detail) => write!(f, "decode error: {detail}"),
        }
    }
}

impl std::error::Error for SubmitError {}
