use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable rendering of the form on stdout.
    Text,
    /// JSON envelopes on stdout.
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let format = match env::var("QUICKBRIEF_OUTPUT_FORMAT").ok().as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = match env::var("QUICKBRIEF_OUTPUT_PRETTY").ok().as_deref() {
            Some(v) if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") => true,
            _ => false,
        };
        OutputConfig { format, pretty }
    }

    /// `--json` forces JSON; without it the environment decides.
    pub fn with_json_flag(mut self, json: bool) -> Self {
        if json { self.format = OutputFormat::Json; }
        self
    }

    pub fn is_json(&self) -> bool { self.format == OutputFormat::Json }
}
