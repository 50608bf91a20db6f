//! Client-side controller for the QuickBrief analysis backend.
//!
//! The [`controller::FormController`] owns the submission lifecycle, the
//! [`client`] module talks to `POST /analyze`, and [`render`] turns UI state
//! into display instructions for whatever front end is attached.

pub mod client;
pub mod controller;
pub mod error;
pub mod messages;
pub mod output;
pub mod render;
pub mod state;
pub mod status;
pub mod telemetry;

pub use client::{AnalysisResponse, AnalyzeRequest, AnalyzeTransport};
pub use controller::{ControllerConfig, FormController, FormEvent, Submission};
pub use error::SubmitError;
pub use render::{render, RenderInstruction, RenderTarget};
pub use state::UiState;
