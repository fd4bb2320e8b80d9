//! Preview Actor
//!
//! Owns the orchestrator and drives it from a single-threaded event loop:
//!
//! ```text
//! FsActor --PreviewMsg--> select! { message | debounce deadline | shutdown poll }
//!                                        |
//!                              PreviewOrchestrator::poll
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::messages::PreviewMsg;
use crate::config::{self, RawSettings};
use crate::logger;
use crate::preview::{
    CycleOutcome, DocumentSource, PreviewLifecycle, PreviewOrchestrator, RenderSurface,
};

/// Upper bound on a single wait, so shutdown is noticed promptly.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Preview Actor - one view's update loop
pub struct PreviewActor<D, S> {
    orchestrator: PreviewOrchestrator<D, S>,
    rx: mpsc::Receiver<PreviewMsg>,
    shutdown_rx: Option<Receiver<()>>,
    /// Settings file and CLI overrides, for hot reload
    config_path: PathBuf,
    overrides: RawSettings,
    name: String,
}

impl<D, S> PreviewActor<D, S>
where
    D: DocumentSource,
    S: RenderSurface,
{
    pub fn new(
        orchestrator: PreviewOrchestrator<D, S>,
        rx: mpsc::Receiver<PreviewMsg>,
        config_path: PathBuf,
        overrides: RawSettings,
        name: String,
    ) -> Self {
        Self {
            orchestrator,
            rx,
            shutdown_rx: None,
            config_path,
            overrides,
            name,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run until shutdown, then tear the view down.
    pub async fn run(mut self) -> PreviewOrchestrator<D, S> {
        self.orchestrator.on_activate(Instant::now());
        self.report();

        loop {
            let sleep = self.sleep_duration();
            let msg = tokio::select! {
                biased;
                Some(msg) = self.rx.recv() => Some(msg),
                _ = tokio::time::sleep(sleep) => None,
            };
            if let Some(msg) = msg {
                self.handle(msg);
            }

            if self.shutdown_requested() {
                crate::debug!("preview"; "shutdown signal received");
                break;
            }

            if self.orchestrator.poll(Instant::now()).is_some() {
                self.report();
            }
        }

        self.orchestrator.on_teardown();
        self.orchestrator
    }

    fn handle(&mut self, msg: PreviewMsg) {
        match msg {
            PreviewMsg::Changed(kind) => self.orchestrator.on_content_changed(kind, Instant::now()),
            PreviewMsg::ConfigChanged => self.reload_settings(),
        }
    }

    fn reload_settings(&mut self) {
        match config::reload_settings(&self.config_path, &self.overrides) {
            Ok(Some(settings)) => {
                crate::log!("config"; "reloaded {}", self.config_path.display());
                self.orchestrator.apply_settings(*settings);
            }
            Ok(None) => {}
            Err(e) => logger::status_error("settings not reloaded", &format!("{e:#}")),
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown_rx
            .as_ref()
            .is_some_and(|rx| rx.try_recv().is_ok())
    }

    /// Time until the debounce deadline, capped for shutdown polling.
    fn sleep_duration(&self) -> Duration {
        self.orchestrator
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(SHUTDOWN_POLL)
            .min(SHUTDOWN_POLL)
    }

    fn report(&self) {
        let Some(outcome) = self.orchestrator.last_outcome() else {
            return;
        };
        match outcome {
            CycleOutcome::Rendered { location } => {
                logger::status_success(&format!("{} → {}", self.name, location));
            }
            CycleOutcome::Diagnostic { message, .. } => {
                logger::status_error(&format!("{}: transform failed", self.name), message);
            }
            CycleOutcome::Skipped => {
                logger::status_warning(&format!("{} not found, preview unchanged", self.name));
            }
            CycleOutcome::SurfaceFailed(reason) => {
                logger::status_error("preview not updated", reason);
            }
        }
    }
}
