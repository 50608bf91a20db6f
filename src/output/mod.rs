pub mod config;
pub mod presenter;
pub mod terminal;
pub mod types;

pub use config::{OutputConfig, OutputFormat};
pub use presenter::Emitter;
pub use terminal::{EnvelopeTarget, TerminalTarget};
pub use types::{Envelope, ErrorPayload};
