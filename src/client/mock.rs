use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::types::{AnalysisResponse, AnalyzeRequest};
use super::AnalyzeTransport;
use crate::error::SubmitError;

/// Queue-backed transport that records every request it sees.
///
/// When built with [`MockTransport::gated`], each call waits for a
/// `notify_one` on the returned handle before answering, which keeps a
/// submission in flight for as long as a test needs.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<AnalysisResponse, SubmitError>>>,
    calls: Mutex<Vec<AnalyzeRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mock = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (mock, gate)
    }

    pub fn push_response(&self, resp: Result<AnalysisResponse, SubmitError>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> Vec<AnalyzeRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyzeTransport for MockTransport {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResponse, SubmitError> {
        self.calls.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(SubmitError::Network("mock transport response queue is empty".into()))
            })
    }
}
