use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use quickbrief::client::HttpTransport;
use quickbrief::output::{EnvelopeTarget, TerminalTarget};
use quickbrief::render::RenderTarget;
use quickbrief::telemetry;
use quickbrief::{ControllerConfig, FormController, FormEvent};

use super::AppCtx;

/// Read URLs from stdin, one submission per line
#[derive(Args, Debug)]
pub struct InteractiveCmd {
    /// Capacity of the event queue between stdin and the form
    #[arg(long, default_value_t = 16)]
    pub queue: usize,
}

/// Map one stdin line to form events. `None` ends the session.
pub fn parse_line(line: &str) -> Option<Vec<FormEvent>> {
    match line.trim() {
        ":quit" | ":q" => None,
        ":cancel" => Some(vec![FormEvent::Cancel]),
        ":clear" => Some(vec![FormEvent::HideAll]),
        // typing a new URL clears a stale error before it is submitted
        url => Some(vec![FormEvent::InputChanged, FormEvent::Submit(url.to_string())]),
    }
}

pub async fn run(app: &AppCtx, args: InteractiveCmd) -> Result<()> {
    let log = telemetry::session();
    let _g = log.root_span_kv([
        ("endpoint", app.client.endpoint()),
        ("queue", args.queue.to_string()),
        ("json", app.output.is_json().to_string()),
    ]).entered();

    let transport = HttpTransport::new(app.client.clone())?;
    let target: Arc<dyn RenderTarget> = if app.output.is_json() {
        Arc::new(EnvelopeTarget::stdout(app.output))
    } else {
        Arc::new(TerminalTarget::stdout())
    };
    let ctrl = Arc::new(FormController::new(Arc::new(transport), target, ControllerConfig::from_env()));

    let (tx, rx) = mpsc::channel(args.queue.max(1));
    let session = tokio::spawn(Arc::clone(&ctrl).run(rx));

    log.info("Enter a transcript URL per line (:cancel, :clear, :quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => Some(":cancel".to_string()),
        };
        let Some(line) = line else { break };
        let Some(events) = parse_line(&line) else { break };
        for event in events {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    }

    drop(tx);
    session.await?;
    log.info("session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_and_urls() {
        assert_eq!(parse_line(":quit"), None);
        assert_eq!(parse_line(" :cancel "), Some(vec![FormEvent::Cancel]));
        assert_eq!(parse_line(":clear"), Some(vec![FormEvent::HideAll]));
        assert_eq!(
            parse_line("https://example.com/call\n"),
            Some(vec![FormEvent::InputChanged, FormEvent::Submit("https://example.com/call".into())])
        );
    }
}
