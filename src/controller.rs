//! Submission lifecycle for the analysis form.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;

use crate::client::{AnalysisResponse, AnalyzeRequest, AnalyzeTransport};
use crate::error::SubmitError;
use crate::messages;
use crate::render::{render, RenderTarget};
use crate::state::UiState;
use crate::status::{self, DEFAULT_ROTATE_INTERVAL};
use crate::telemetry::{self, ctx::LogCtx};
use crate::telemetry::ops::session::Phase as SessionPhase;
use crate::telemetry::ops::submit::{Phase as SubmitPhase, Submit};

#[derive(Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    /// How often the loading status line advances.
    pub rotate_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { rotate_interval: DEFAULT_ROTATE_INTERVAL }
    }
}

impl ControllerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset, unparsable and zero
    /// values keep the default.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(ms) = var("QUICKBRIEF_ROTATE_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            if ms > 0 {
                cfg.rotate_interval = Duration::from_millis(ms);
            }
        }
        cfg
    }
}

/// Input from whatever UI is driving the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Submit(String),
    InputChanged,
    Cancel,
    HideAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Completed(AnalysisResponse),
    /// Another submission was in flight; nothing happened.
    Ignored,
    Cancelled,
}

/// `true` for non-empty input that parses as an absolute http(s) URL with a host.
pub fn validate_url(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }
    match Url::parse(input) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

// Display state shared with every live `Ticket`.
struct FormState {
    target: Arc<dyn RenderTarget>,
    ui: Mutex<UiState>,
    in_flight: AtomicBool,
    abort: Mutex<Option<CancellationToken>>,
}

impl FormState {
    // Render under the state lock so concurrent transitions reach the
    // target in the order they were made.
    fn transition(&self, next: UiState) {
        let mut st = self.ui.lock().expect("ui state mutex poisoned");
        tracing::debug!(from = st.name(), to = next.name(), "transition");
        *st = next;
        self.target.apply(&render(&st));
    }

    fn advance_status(&self) {
        let mut st = self.ui.lock().expect("ui state mutex poisoned");
        if st.advance_loading() {
            self.target.apply(&render(&st));
        }
    }

    fn release(&self) {
        self.abort.lock().expect("abort slot mutex poisoned").take();
        {
            let mut st = self.ui.lock().expect("ui state mutex poisoned");
            if st.is_loading() {
                *st = UiState::Idle;
                self.target.apply(&render(&st));
            }
        }
        self.in_flight.store(false, Ordering::Release);
    }
}

// Proof that `begin` took the in-flight guard. Dropping it ends the
// submission, whether `finish` ran to completion, was dropped mid-request,
// or never got polled at all.
struct Ticket {
    url: String,
    token: CancellationToken,
    form: Arc<FormState>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.form.release();
    }
}

pub struct FormController {
    transport: Arc<dyn AnalyzeTransport>,
    cfg: ControllerConfig,
    form: Arc<FormState>,
}

impl FormController {
    /// Build the controller and paint the idle form once.
    pub fn new(
        transport: Arc<dyn AnalyzeTransport>,
        target: Arc<dyn RenderTarget>,
        cfg: ControllerConfig,
    ) -> Self {
        let form = Arc::new(FormState {
            target,
            ui: Mutex::new(UiState::Idle),
            in_flight: AtomicBool::new(false),
            abort: Mutex::new(None),
        });
        form.transition(UiState::Idle);
        Self { transport, cfg, form }
    }

    pub fn validate(url: &str) -> bool {
        validate_url(url)
    }

    pub fn state(&self) -> UiState {
        self.form.ui.lock().expect("ui state mutex poisoned").clone()
    }

    pub fn is_busy(&self) -> bool {
        self.form.in_flight.load(Ordering::Acquire)
    }

    /// Validate `url`, post it, and leave the form showing the outcome.
    ///
    /// Returns `Ok(Submission::Ignored)` without side effects while another
    /// submission is in flight.
    pub async fn submit(&self, url: &str) -> Result<Submission, SubmitError> {
        let log = telemetry::submit();
        let span = log.root_span_kv([("url", url.trim().to_string())]);
        async {
            match self.begin(url, &log) {
                Ok(Some(ticket)) => self.finish(ticket, &log).await,
                Ok(None) => Ok(Submission::Ignored),
                Err(err) => Err(err),
            }
        }
        .instrument(span)
        .await
    }

    /// Abort the in-flight submission, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        match self.form.abort.lock().expect("abort slot mutex poisoned").as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Hide every region. Ignored while a submission is in flight, since the
    /// loading region belongs to it; use [`FormController::cancel`] instead.
    pub fn hide_all(&self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.form.transition(UiState::Idle);
        true
    }

    /// The user edited the URL field: drop a stale error banner.
    pub fn input_changed(&self) {
        let mut st = self.form.ui.lock().expect("ui state mutex poisoned");
        if st.is_error() {
            *st = UiState::Idle;
            self.form.target.apply(&render(&st));
        }
    }

    /// Drive the form from `events` until the sender side closes, then wait
    /// for any in-flight submission to settle.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<FormEvent>) {
        let log = telemetry::session();
        let span = log.root_span();
        async move {
            let mut submissions: JoinSet<()> = JoinSet::new();
            loop {
                tokio::select! {
                    Some(joined) = submissions.join_next(), if !submissions.is_empty() => {
                        if let Err(err) = joined {
                            log.warn(format!("submission task failed: {err}"));
                        }
                    }
                    event = events.recv() => match event {
                        Some(event) => {
                            let _s = log.span(&SessionPhase::Event).entered();
                            self.handle_event(event, &mut submissions);
                        }
                        None => break,
                    },
                }
            }

            {
                let _s = log.span(&SessionPhase::Drain).entered();
                log.debug(format!("event source closed; {} submission(s) pending", submissions.len()));
            }
            while let Some(joined) = submissions.join_next().await {
                if let Err(err) = joined {
                    log.warn(format!("submission task failed: {err}"));
                }
            }
        }
        .instrument(span)
        .await
    }

    fn handle_event(self: &Arc<Self>, event: FormEvent, submissions: &mut JoinSet<()>) {
        match event {
            FormEvent::Submit(url) => {
                let log = telemetry::submit();
                let span = log.root_span_kv([("url", url.trim().to_string())]);
                let ticket = {
                    let _g = span.enter();
                    self.begin(&url, &log)
                };
                if let Ok(Some(ticket)) = ticket {
                    let this = Arc::clone(self);
                    submissions.spawn(
                        async move {
                            let _ = this.finish(ticket, &log).await;
                        }
                        .instrument(span),
                    );
                }
            }
            FormEvent::InputChanged => self.input_changed(),
            FormEvent::Cancel => {
                self.cancel();
            }
            FormEvent::HideAll => {
                self.hide_all();
            }
        }
    }

    // Synchronous half of a submission: guard, validate, enter Loading.
    // The guard is taken before validation so a rejected URL can never
    // paint over another submission's loading state.
    fn begin(&self, url: &str, log: &LogCtx<Submit>) -> Result<Option<Ticket>, SubmitError> {
        if self
            .form
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log.debug("submission already in flight; ignoring");
            return Ok(None);
        }

        let url = url.trim();
        let valid = {
            let _s = log.span(&SubmitPhase::Validate).entered();
            validate_url(url)
        };
        if !valid {
            log.warn_kv("rejected input", [("url", url.to_string())]);
            self.form.transition(UiState::Error(messages::INVALID_URL.to_string()));
            self.form.in_flight.store(false, Ordering::Release);
            return Err(SubmitError::InvalidInput);
        }

        let token = CancellationToken::new();
        *self.form.abort.lock().expect("abort slot mutex poisoned") = Some(token.clone());
        self.form.transition(UiState::loading());
        Ok(Some(Ticket { url: url.to_string(), token, form: Arc::clone(&self.form) }))
    }

    // Asynchronous half: one request, raced against cancellation, with the
    // status rotation running alongside. The ticket is dropped on the way
    // out, which re-arms the form.
    async fn finish(&self, ticket: Ticket, log: &LogCtx<Submit>) -> Result<Submission, SubmitError> {
        log.info_kv("request started", [("url", ticket.url.clone())]);
        let request = AnalyzeRequest::new(ticket.url.clone());
        let outcome = tokio::select! {
            _ = ticket.token.cancelled() => None,
            res = self.transport.analyze(request).instrument(log.span(&SubmitPhase::Request)) => Some(res),
            never = status::rotate(self.cfg.rotate_interval, || self.form.advance_status()) => match never {},
        };

        let _s = log.span(&SubmitPhase::Render).entered();
        match outcome {
            None => {
                log.info("submission cancelled");
                self.form.transition(UiState::Idle);
                Ok(Submission::Cancelled)
            }
            Some(Ok(resp)) => {
                log.info("analysis received");
                self.form.transition(UiState::Result(resp.clone()));
                Ok(Submission::Completed(resp))
            }
            Some(Err(err)) => {
                log.warn_kv("analysis failed", [("error", err.to_string())]);
                self.form.transition(UiState::Error(err.user_message()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;
    use crate::render::{RecordingTarget, Region, SentimentTone};

    fn controller(mock: &Arc<MockTransport>) -> (Arc<FormController>, Arc<RecordingTarget>) {
        let target = Arc::new(RecordingTarget::new());
        let ctrl = FormController::new(mock.clone(), target.clone(), ControllerConfig::default());
        (Arc::new(ctrl), target)
    }

    async fn wait_for_call(mock: &MockTransport, n: usize) {
        while mock.calls().len() < n {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn validate_rejects_non_http_inputs() {
        for bad in [
            "",
            "   ",
            "not-a-url",
            "ftp://example.com/file",
            "javascript:alert('xss')",
            "file:///etc/passwd",
            "mailto:ir@example.com",
            "http://",
            "https://",
            "example.com/earnings",
        ] {
            assert!(!validate_url(bad), "{bad:?} should be rejected");
        }
        assert!(validate_url("https://example.com/q3-call"));
        assert!(validate_url("  http://localhost:8080/transcript  "));
        assert!(FormController::validate("HTTPS://EXAMPLE.COM"));
    }

    #[test]
    fn rotate_interval_reads_millis_and_skips_zero() {
        let cfg = ControllerConfig::from_vars(|k| (k == "QUICKBRIEF_ROTATE_MS").then(|| "250".to_string()));
        assert_eq!(cfg.rotate_interval, Duration::from_millis(250));
        for bad in ["0", "soon", ""] {
            let cfg = ControllerConfig::from_vars(|_| Some(bad.to_string()));
            assert_eq!(cfg.rotate_interval, DEFAULT_ROTATE_INTERVAL, "{bad:?}");
        }
        assert_eq!(ControllerConfig::from_vars(|_| None), ControllerConfig::default());
    }

    #[tokio::test]
    async fn invalid_input_shows_error_without_request() {
        let mock = Arc::new(MockTransport::new());
        let (ctrl, target) = controller(&mock);

        for bad in ["", "ftp://example.com/file", "not a url"] {
            assert_eq!(ctrl.submit(bad).await, Err(SubmitError::InvalidInput));
        }
        assert!(mock.calls().is_empty());
        assert_eq!(ctrl.state(), UiState::Error(messages::INVALID_URL.into()));
        let view = target.snapshot();
        assert_eq!(view.visible_regions(), vec![Region::Error]);
        assert_eq!(view.error_message, "Please enter a valid URL");
        assert!(!ctrl.is_busy());
    }

    #[tokio::test]
    async fn successful_submission_renders_result() {
        let mock = Arc::new(MockTransport::new());
        let resp = AnalysisResponse {
            sentiment: Some("Bullish".into()),
            good_news: Some(vec![]),
            verdict: Some("Buy".into()),
            ..Default::default()
        };
        mock.push_response(Ok(resp.clone()));
        let (ctrl, target) = controller(&mock);

        let out = ctrl.submit("  https://example.com/call ").await.unwrap();
        assert_eq!(out, Submission::Completed(resp));
        assert_eq!(mock.calls(), vec![AnalyzeRequest::new("https://example.com/call")]);

        let view = target.snapshot();
        assert_eq!(view.visible_regions(), vec![Region::Result]);
        assert_eq!(view.sentiment, "Bullish");
        assert_eq!(view.sentiment_tone, Some(SentimentTone::Positive));
        assert_eq!(view.good_news.len(), 1);
        assert_eq!(view.good_news[0].text, "No items found");
        assert_eq!(view.verdict, "Buy");
        assert!(view.submit_enabled);
        assert_eq!(view.submit_label, messages::SUBMIT_LABEL_READY);
        assert!(!ctrl.is_busy());

        // idle on construction, loading, result
        let batches = target.batches();
        assert_eq!(batches.len(), 3);
    }

    #[tokio::test]
    async fn resubmitting_while_loading_is_a_noop() {
        let (mock, gate) = MockTransport::gated();
        let mock = Arc::new(mock);
        mock.push_response(Ok(AnalysisResponse::default()));
        let (ctrl, target) = controller(&mock);

        let first = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.submit("https://example.com/a").await }
        });
        wait_for_call(&mock, 1).await;
        assert!(ctrl.is_busy());
        assert!(!target.snapshot().submit_enabled);

        assert_eq!(ctrl.submit("https://example.com/b").await, Ok(Submission::Ignored));
        assert_eq!(ctrl.submit("not a url").await, Ok(Submission::Ignored));
        assert_eq!(mock.calls().len(), 1);
        assert!(ctrl.state().is_loading());

        gate.notify_one();
        let out = first.await.unwrap().unwrap();
        assert!(matches!(out, Submission::Completed(_)));
        assert_eq!(mock.calls().len(), 1);
        assert!(!ctrl.is_busy());
    }

    #[tokio::test]
    async fn server_error_message_passes_through_when_no_keyword_matches() {
        let mock = Arc::new(MockTransport::new());
        mock.push_response(Err(SubmitError::Server { status: 403, message: "blocked".into() }));
        let (ctrl, target) = controller(&mock);

        let err = ctrl.submit("https://example.com/call").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(target.snapshot().error_message, "blocked");
        assert_eq!(target.snapshot().visible_regions(), vec![Region::Error]);
    }

    #[tokio::test]
    async fn network_failure_renders_connectivity_message() {
        let mock = Arc::new(MockTransport::new());
        mock.push_response(Err(SubmitError::Network("Failed to fetch".into())));
        let (ctrl, target) = controller(&mock);

        let err = ctrl.submit("https://example.com/call").await.unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)));
        assert_eq!(target.snapshot().error_message, messages::NETWORK_ERROR);
        assert!(target.snapshot().submit_enabled);
        assert!(!ctrl.is_busy());
    }

    #[tokio::test]
    async fn hide_all_twice_leaves_idle() {
        let mock = Arc::new(MockTransport::new());
        let (ctrl, target) = controller(&mock);
        assert!(ctrl.submit("nope").await.is_err());

        for _ in 0..2 {
            assert!(ctrl.hide_all());
            assert_eq!(ctrl.state(), UiState::Idle);
            assert!(target.snapshot().visible_regions().is_empty());
        }
    }

    #[tokio::test]
    async fn input_change_clears_error_but_not_result() {
        let mock = Arc::new(MockTransport::new());
        mock.push_response(Ok(AnalysisResponse::default()));
        let (ctrl, target) = controller(&mock);

        assert!(ctrl.submit("nope").await.is_err());
        ctrl.input_changed();
        assert_eq!(ctrl.state(), UiState::Idle);
        assert!(target.snapshot().visible_regions().is_empty());

        ctrl.submit("https://example.com/call").await.unwrap();
        ctrl.input_changed();
        assert_eq!(target.snapshot().visible_regions(), vec![Region::Result]);
    }

    #[tokio::test]
    async fn cancel_returns_to_idle_and_frees_the_guard() {
        let (mock, _gate) = MockTransport::gated();
        let mock = Arc::new(mock);
        let (ctrl, target) = controller(&mock);
        assert!(!ctrl.cancel());

        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.submit("https://example.com/slow").await }
        });
        wait_for_call(&mock, 1).await;
        assert!(!ctrl.hide_all());
        assert!(ctrl.cancel());

        assert_eq!(pending.await.unwrap(), Ok(Submission::Cancelled));
        assert_eq!(ctrl.state(), UiState::Idle);
        assert!(target.snapshot().visible_regions().is_empty());
        assert!(target.snapshot().submit_enabled);
        assert!(!ctrl.is_busy());
        assert!(!ctrl.cancel());
    }

    #[tokio::test]
    async fn dropping_a_submission_mid_flight_releases_the_form() {
        let (mock, _gate) = MockTransport::gated();
        let mock = Arc::new(mock);
        let (ctrl, target) = controller(&mock);

        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.submit("https://example.com/slow").await }
        });
        wait_for_call(&mock, 1).await;
        pending.abort();
        let _ = pending.await;

        assert!(!ctrl.is_busy());
        assert_eq!(ctrl.state(), UiState::Idle);
        assert!(target.snapshot().submit_enabled);
    }

    #[tokio::test]
    async fn dropping_the_event_loop_before_the_request_starts_releases_the_form() {
        let mock = Arc::new(MockTransport::new());
        mock.push_response(Ok(AnalysisResponse::default()));
        let (ctrl, target) = controller(&mock);
        let (tx, rx) = mpsc::channel(8);
        tx.send(FormEvent::Submit("https://example.com/a".into())).await.unwrap();

        // one poll handles the Submit and spawns the request task, which
        // has not run yet when the session goes away
        let mut session = Box::pin(ctrl.clone().run(rx));
        tokio::select! {
            biased;
            _ = &mut session => panic!("session ended while the sender is open"),
            _ = std::future::ready(()) => {}
        }
        assert!(ctrl.is_busy());
        assert!(ctrl.state().is_loading());
        drop(session);

        tokio::time::timeout(Duration::from_secs(5), async {
            while ctrl.is_busy() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("form stayed busy after the session was dropped");
        assert!(mock.calls().is_empty());
        assert_eq!(ctrl.state(), UiState::Idle);
        assert!(target.snapshot().submit_enabled);

        let out = ctrl.submit("https://example.com/b").await.unwrap();
        assert!(matches!(out, Submission::Completed(_)));
        assert_eq!(mock.calls(), vec![AnalyzeRequest::new("https://example.com/b")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_invalid_input_never_replaces_loading() {
        let (mock, gate) = MockTransport::gated();
        let mock = Arc::new(mock);
        mock.push_response(Ok(AnalysisResponse::default()));
        let (ctrl, _target) = controller(&mock);

        let mut rejects = JoinSet::new();
        for _ in 0..32 {
            let ctrl = ctrl.clone();
            rejects.spawn(async move { ctrl.submit("not a url").await });
        }
        let valid = tokio::spawn({
            let ctrl = ctrl.clone();
            async move {
                loop {
                    match ctrl.submit("https://example.com/a").await {
                        Ok(Submission::Ignored) => tokio::task::yield_now().await,
                        other => return other,
                    }
                }
            }
        });
        while let Some(joined) = rejects.join_next().await {
            let out = joined.unwrap();
            assert!(matches!(out, Err(SubmitError::InvalidInput) | Ok(Submission::Ignored)));
        }
        wait_for_call(&mock, 1).await;

        assert!(ctrl.state().is_loading());
        gate.notify_one();
        assert!(matches!(valid.await.unwrap(), Ok(Submission::Completed(_))));
        assert!(!ctrl.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn status_line_rotates_while_loading() {
        let (mock, gate) = MockTransport::gated();
        let mock = Arc::new(mock);
        mock.push_response(Ok(AnalysisResponse::default()));
        let (ctrl, target) = controller(&mock);

        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.submit("https://example.com/call").await }
        });
        wait_for_call(&mock, 1).await;
        assert_eq!(target.snapshot().loading_message, messages::LOADING_MESSAGES[0]);

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(ctrl.state(), UiState::Loading { step: 1 });
        assert_eq!(target.snapshot().loading_message, "Processing transcript text...");

        // four more ticks wrap back to the first line
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(ctrl.state(), UiState::Loading { step: 0 });

        gate.notify_one();
        assert!(matches!(pending.await.unwrap(), Ok(Submission::Completed(_))));
        let batches = target.batches().len();

        // rotation is gone once the submission has settled
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(target.batches().len(), batches);
        assert_eq!(target.snapshot().visible_regions(), vec![Region::Result]);
    }

    #[tokio::test]
    async fn event_loop_processes_events_in_order() {
        let (mock, _gate) = MockTransport::gated();
        let mock = Arc::new(mock);
        let (ctrl, target) = controller(&mock);
        let (tx, rx) = mpsc::channel(8);
        let session = tokio::spawn(ctrl.clone().run(rx));

        tx.send(FormEvent::Submit("nope".into())).await.unwrap();
        tx.send(FormEvent::InputChanged).await.unwrap();
        tx.send(FormEvent::Submit("https://example.com/a".into())).await.unwrap();
        wait_for_call(&mock, 1).await;
        tx.send(FormEvent::Submit("https://example.com/b".into())).await.unwrap();
        tx.send(FormEvent::HideAll).await.unwrap();
        tx.send(FormEvent::Cancel).await.unwrap();
        drop(tx);
        session.await.unwrap();

        assert_eq!(mock.calls(), vec![AnalyzeRequest::new("https://example.com/a")]);
        assert_eq!(ctrl.state(), UiState::Idle);
        assert!(!ctrl.is_busy());
        assert!(target.snapshot().visible_regions().is_empty());
    }
}
