//! The preview orchestrator: owns one view's update cycle.

use std::time::Instant;

use super::{ArtifactSlot, RenderSurface};
use super::host::{ChangeKind, DocumentSource, PreviewLifecycle};
use super::pipeline::{Rendered, render_document};
use super::state::{Phase, Scheduler};
use crate::config::PreviewSettings;
use crate::transform::{LoopGuardedTransformer, OxcEngine, TransformEngine};

/// What a completed cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Preview installed at `location`.
    Rendered { location: String },
    /// Transform failed; the diagnostic document is installed at `location`.
    Diagnostic { location: String, message: String },
    /// No active document; the live artifact was left untouched.
    Skipped,
    /// The surface could not take the document.
    SurfaceFailed(String),
}

/// Drives extract → transform → assemble on change and keeps exactly one
/// artifact live on the surface.
pub struct PreviewOrchestrator<D, S, E = OxcEngine> {
    source: D,
    surface: S,
    transformer: LoopGuardedTransformer<E>,
    scheduler: Scheduler,
    slot: ArtifactSlot,
    settings: PreviewSettings,
    cycles: u64,
    last_outcome: Option<CycleOutcome>,
}

impl<D, S> PreviewOrchestrator<D, S>
where
    D: DocumentSource,
    S: RenderSurface,
{
    pub fn new(source: D, surface: S, settings: PreviewSettings) -> Self {
        Self::with_engine(source, surface, OxcEngine, settings)
    }
}

impl<D, S, E> PreviewOrchestrator<D, S, E>
where
    D: DocumentSource,
    S: RenderSurface,
    E: TransformEngine,
{
    pub fn with_engine(source: D, surface: S, engine: E, settings: PreviewSettings) -> Self {
        Self {
            source,
            surface,
            transformer: LoopGuardedTransformer::with_engine(engine, settings.loop_guard()),
            scheduler: Scheduler::new(settings.debounce(), settings.update_on_save_only),
            slot: ArtifactSlot::new(),
            settings,
            cycles: 0,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn is_closed(&self) -> bool {
        self.scheduler.is_closed()
    }

    /// When the event loop should call `poll` next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Location of the live artifact.
    pub fn live_location(&self) -> Option<&str> {
        self.slot.live().map(|handle| handle.location())
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn last_outcome(&self) -> Option<&CycleOutcome> {
        self.last_outcome.as_ref()
    }

    /// Run the scheduled cycle if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<CycleOutcome> {
        if !self.scheduler.begin_if_due(now) {
            return None;
        }
        let outcome = self.run_cycle();
        self.cycles += 1;
        self.scheduler.finish(now);
        self.last_outcome = Some(outcome.clone());
        Some(outcome)
    }

    fn run_cycle(&mut self) -> CycleOutcome {
        let Some(text) = self.source.read() else {
            crate::debug!("preview"; "no active document, skipping");
            return CycleOutcome::Skipped;
        };

        let rendered = render_document(&text, &self.transformer);
        match self.slot.install(&mut self.surface, rendered.document()) {
            Ok(handle) => {
                let location = handle.location().to_string();
                match rendered {
                    Rendered::Preview(_) => CycleOutcome::Rendered { location },
                    Rendered::Diagnostic { error, .. } => CycleOutcome::Diagnostic {
                        location,
                        message: error.to_string(),
                    },
                }
            }
            Err(e) => CycleOutcome::SurfaceFailed(e.to_string()),
        }
    }
}

impl<D, S, E> PreviewOrchestrator<D, S, E>
where
    D: DocumentSource,
    S: RenderSurface,
    E: TransformEngine + Clone,
{
    /// Apply reloaded settings.
    ///
    /// A changed loop budget builds a fresh transformer; trigger policy
    /// changes take effect from the next change notification.
    pub fn apply_settings(&mut self, settings: PreviewSettings) {
        if settings.loop_guard() != self.transformer.budget() {
            let engine = self.transformer.engine().clone();
            self.transformer = LoopGuardedTransformer::with_engine(engine, settings.loop_guard());
        }
        self.scheduler
            .reconfigure(settings.debounce(), settings.update_on_save_only);
        self.settings = settings;
    }
}

impl<D, S, E> PreviewLifecycle for PreviewOrchestrator<D, S, E>
where
    D: DocumentSource,
    S: RenderSurface,
    E: TransformEngine,
{
    fn on_activate(&mut self, now: Instant) {
        self.scheduler.schedule_now(now);
        self.poll(now);
    }

    fn on_content_changed(&mut self, kind: ChangeKind, now: Instant) {
        if self.scheduler.notify(kind, now) {
            crate::debug!("preview"; "{} scheduled render", kind.label());
        }
    }

    fn on_teardown(&mut self) {
        self.slot.clear(&mut self.surface);
        self.scheduler.close();
    }
}
