use crate::client::AnalysisResponse;
use crate::messages;

/// What the form is currently showing. Exactly one variant is live, so at
/// most one of the loading, result and error regions can be visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Idle,
    /// `step` indexes the rotating status line.
    Loading { step: usize },
    Result(AnalysisResponse),
    Error(String),
}

impl UiState {
    pub fn loading() -> Self {
        UiState::Loading { step: 0 }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, UiState::Error(_))
    }

    pub fn loading_message(&self) -> Option<&'static str> {
        match self {
            UiState::Loading { step } => Some(messages::loading_message(*step)),
            _ => None,
        }
    }

    /// Move to the next status line. Returns `false` (and does nothing) when
    /// not loading.
    pub fn advance_loading(&mut self) -> bool {
        match self {
            UiState::Loading { step } => {
                *step = (*step + 1) % messages::LOADING_MESSAGES.len();
                true
            }
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UiState::Idle => "idle",
            UiState::Loading { .. } => "loading",
            UiState::Result(_) => "result",
            UiState::Error(_) => "error",
        }
    }
}
