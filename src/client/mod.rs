use async_trait::async_trait;

use crate::error::SubmitError;

mod http;
mod mock;
mod types;

pub use http::{AnalyzeClientConfig, HttpTransport};
pub use mock::MockTransport;
pub use types::{AnalysisResponse, AnalyzeRequest, ApiErrorBody};

/// One round trip to the analysis endpoint.
#[async_trait]
pub trait AnalyzeTransport: Send + Sync {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResponse, SubmitError>;
}
