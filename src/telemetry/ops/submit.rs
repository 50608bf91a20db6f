use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Submit;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Validate, Request, Render }

impl PhaseSpan for Phase {
    fn span(&self) -> Span { match self {
        Phase::Validate => info_span!("validate"),
        Phase::Request => info_span!("request"),
        Phase::Render => info_span!("render"),
    }}
}

impl OpMarker for Submit {
    const NAME: &'static str = "submit";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("submit") }
}
