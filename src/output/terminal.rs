use std::io::{self, Write};
use std::sync::Mutex;

use super::config::OutputConfig;
use super::presenter::Emitter;
use super::types::Envelope;
use crate::render::{DisplayModel, ListItem, RenderInstruction, RenderTarget, SentimentTone};

/// Prints the visible region as plain text whenever it changes.
pub struct TerminalTarget<W: Write + Send> {
    inner: Mutex<TerminalState<W>>,
}

struct TerminalState<W> {
    model: DisplayModel,
    last: String,
    out: W,
}

impl TerminalTarget<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalTarget<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Mutex::new(TerminalState { model: DisplayModel::default(), last: String::new(), out }),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner().expect("terminal mutex poisoned").out
    }
}

impl<W: Write + Send> RenderTarget for TerminalTarget<W> {
    fn apply(&self, instructions: &[RenderInstruction]) {
        let mut st = self.inner.lock().expect("terminal mutex poisoned");
        st.model.apply(instructions);
        let text = describe(&st.model);
        if text == st.last {
            return;
        }
        if !text.is_empty() {
            // a closed stdout is not worth tearing the controller down for
            let _ = writeln!(st.out, "{text}").and_then(|_| st.out.flush());
        }
        st.last = text;
    }
}

/// Text for whichever region is visible; empty when the form is idle.
pub fn describe(model: &DisplayModel) -> String {
    if model.loading_visible {
        return format!("⏳ {}", model.loading_message);
    }
    if model.error_visible {
        return format!("❌ {}", model.error_message);
    }
    if !model.result_visible {
        return String::new();
    }

    let mut lines = Vec::new();
    match model.sentiment_tone {
        Some(tone) => lines.push(format!("📊 Sentiment: {} [{}]", model.sentiment, tone_label(tone))),
        None => lines.push(format!("📊 Sentiment: {}", model.sentiment)),
    }
    push_list(&mut lines, "✅ Good news:", &model.good_news);
    push_list(&mut lines, "⚠️ Bad news:", &model.bad_news);
    push_list(&mut lines, "🤝 Key promises:", &model.key_promises);
    lines.push(format!("🧾 Verdict: {}", model.verdict));
    lines.join("\n")
}

fn push_list(lines: &mut Vec<String>, title: &str, items: &[ListItem]) {
    lines.push(title.to_string());
    for item in items {
        if item.placeholder {
            lines.push(format!("  ({})", item.text));
        } else {
            lines.push(format!("  - {}", item.text));
        }
    }
}

fn tone_label(tone: SentimentTone) -> &'static str {
    match tone {
        SentimentTone::Positive => "positive",
        SentimentTone::Negative => "negative",
        SentimentTone::Neutral => "neutral",
        SentimentTone::Informational => "info",
    }
}

/// Emits each instruction batch as a `render` envelope.
pub struct EnvelopeTarget<W: Write + Send> {
    emitter: Emitter,
    out: Mutex<W>,
}

impl EnvelopeTarget<io::Stdout> {
    pub fn stdout(cfg: OutputConfig) -> Self {
        Self::new(cfg, io::stdout())
    }
}

impl<W: Write + Send> EnvelopeTarget<W> {
    pub fn new(cfg: OutputConfig, out: W) -> Self {
        Self { emitter: Emitter::new(cfg), out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().expect("envelope target mutex poisoned")
    }
}

impl<W: Write + Send> RenderTarget for EnvelopeTarget<W> {
    fn apply(&self, instructions: &[RenderInstruction]) {
        let env = match Envelope::result("render", &instructions) {
            Ok(env) => env,
            Err(err) => {
                tracing::warn!("render batch not serializable: {err}");
                return;
            }
        };
        let mut out = self.out.lock().expect("envelope target mutex poisoned");
        let _ = self.emitter.emit_to(&env, &mut *out).and_then(|_| out.flush());
    }
}
