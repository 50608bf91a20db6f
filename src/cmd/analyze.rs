use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use quickbrief::client::HttpTransport;
use quickbrief::output::{ErrorPayload, TerminalTarget};
use quickbrief::render::{RecordingTarget, RenderTarget};
use quickbrief::telemetry;
use quickbrief::telemetry::ops::analyze::Phase as AnalyzePhase;
use quickbrief::{ControllerConfig, FormController, Submission};

use super::AppCtx;

/// Analyze a single transcript URL and print the summary
#[derive(Args, Debug)]
pub struct AnalyzeCmd {
    /// URL of the earnings call transcript
    pub url: String,
}

pub async fn run(app: &AppCtx, args: AnalyzeCmd) -> Result<()> {
    let log = telemetry::analyze();
    let _g = log.root_span_kv([
        ("url", args.url.clone()),
        ("endpoint", app.client.endpoint()),
        ("timeout", format!("{:?}", app.client.timeout)),
        ("json", app.output.is_json().to_string()),
    ]).entered();

    let ctrl = {
        let _s = log.span(&AnalyzePhase::Prepare).entered();
        let transport = HttpTransport::new(app.client.clone())?;
        // JSON mode prints one envelope at the end instead of live updates
        let target: Arc<dyn RenderTarget> = if app.output.is_json() {
            Arc::new(RecordingTarget::new())
        } else {
            Arc::new(TerminalTarget::stdout())
        };
        Arc::new(FormController::new(Arc::new(transport), target, ControllerConfig::from_env()))
    };

    let interrupt = tokio::spawn({
        let ctrl = Arc::clone(&ctrl);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl.cancel();
            }
        }
    });
    let outcome = ctrl.submit(&args.url).await;
    interrupt.abort();

    let _s = log.span(&AnalyzePhase::Output).entered();
    match outcome {
        Ok(Submission::Completed(resp)) => {
            if app.output.is_json() {
                log.result(&app.output, &resp)?;
            }
            Ok(())
        }
        Ok(Submission::Cancelled) => {
            log.warn("analysis cancelled");
            bail!("analysis cancelled")
        }
        Ok(Submission::Ignored) => bail!("another analysis is already running"),
        Err(err) => {
            if app.output.is_json() {
                log.failure(&app.output, &ErrorPayload::from(&err))?;
            }
            log.error(format!("❌ {err}"));
            bail!("{}", err.user_message())
        }
    }
}
