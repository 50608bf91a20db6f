use serde::Serialize;
use std::io::{self, Write};
use std::marker::PhantomData;
use tracing::{info, debug, warn, error, Span};

use crate::output::{Emitter, Envelope, ErrorPayload, OutputConfig};

pub trait PhaseSpan {
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn debug(&self, msg: impl AsRef<str>) { if self.json { debug!(op = %self.op_name(), "{}", msg.as_ref()); } else { debug!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }
    pub fn error(&self, msg: impl AsRef<str>) { if self.json { error!(op = %self.op_name(), "{}", msg.as_ref()); } else { error!("{}", msg.as_ref()); } }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{} {}", msg, details); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{} {}", msg, details); }
    }

    /// Write a success envelope for this op to stdout.
    pub fn result<T: Serialize>(&self, out: &OutputConfig, result: &T) -> anyhow::Result<()> {
        let mut stdout = io::stdout().lock();
        self.result_to(out, result, &mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn result_to<T: Serialize>(&self, out: &OutputConfig, result: &T, w: &mut dyn Write) -> anyhow::Result<()> {
        let env = Envelope::result(self.op_name(), result)?;
        Emitter::new(*out).emit_to(&env, w)?;
        Ok(())
    }

    /// Write a failure envelope for this op to stdout.
    pub fn failure(&self, out: &OutputConfig, err: &ErrorPayload) -> anyhow::Result<()> {
        let mut stdout = io::stdout().lock();
        self.failure_to(out, err, &mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn failure_to(&self, out: &OutputConfig, err: &ErrorPayload, w: &mut dyn Write) -> anyhow::Result<()> {
        let env = Envelope::failure(self.op_name(), err);
        Emitter::new(*out).emit_to(&env, w)?;
        Ok(())
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes_follow_the_resolved_output_config() {
        use crate::error::SubmitError;
        use crate::output::OutputFormat;

        let log = crate::telemetry::analyze();
        let pretty = OutputConfig { format: OutputFormat::Json, pretty: true };
        let mut buf = Vec::new();
        log.result_to(&pretty, &serde_json::json!({"verdict": "Buy"}), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().count() > 1);
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["op"], "analyze");
        assert_eq!(v["result"]["verdict"], "Buy");

        let compact = OutputConfig { format: OutputFormat::Json, pretty: false };
        let mut buf = Vec::new();
        log.failure_to(&compact, &ErrorPayload::from(&SubmitError::Timeout), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["ok"], false);
    }

    #[test]
    fn kv_pairs_join_with_spaces() {
        let s = kv_to_string([("url", "https://a.example".to_string()), ("state", "idle".to_string())]);
        assert_eq!(s, "url=https://a.example state=idle");
        assert_eq!(kv_to_string(Vec::<(&str, String)>::new()), "");
    }
}
