use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Session;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Event, Drain }

impl PhaseSpan for Phase {
    fn span(&self) -> Span { match self {
        Phase::Event => info_span!("event"),
        Phase::Drain => info_span!("drain"),
    }}
}

impl OpMarker for Session {
    const NAME: &'static str = "session";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("session") }
}
