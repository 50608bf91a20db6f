use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Analyze;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Prepare, Output }

impl PhaseSpan for Phase {
    fn span(&self) -> Span { match self {
        Phase::Prepare => info_span!("prepare"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Analyze {
    const NAME: &'static str = "analyze";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("analyze") }
}
