//! Orchestrator lifecycle tests with in-memory collaborators.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use super::*;
use crate::config::PreviewSettings;

// =============================================================================
// Fakes
// =============================================================================

/// Document whose content the test edits through a shared cell.
#[derive(Clone, Default)]
struct MemoryDocument(Rc<RefCell<Option<String>>>);

impl MemoryDocument {
    fn with(text: &str) -> Self {
        let doc = Self::default();
        doc.set(text);
        doc
    }

    fn set(&self, text: &str) {
        *self.0.borrow_mut() = Some(text.to_string());
    }

    fn close(&self) {
        *self.0.borrow_mut() = None;
    }
}

impl DocumentSource for MemoryDocument {
    fn read(&self) -> Option<String> {
        self.0.borrow().clone()
    }
}

/// Surface recording every document and tracking live handles.
#[derive(Default)]
struct CountingSurface {
    next: u64,
    live: FxHashSet<u64>,
    documents: Vec<String>,
    releases: usize,
    fail: bool,
}

impl RenderSurface for CountingSurface {
    fn create(&mut self, document: &str) -> Result<ArtifactHandle, SurfaceError> {
        if self.fail {
            return Err(SurfaceError::Unavailable("no container".into()));
        }
        self.next += 1;
        self.live.insert(self.next);
        self.documents.push(document.to_string());
        Ok(ArtifactHandle::new(self.next, format!("mem:{}", self.next)))
    }

    fn display(&mut self, _: &ArtifactHandle) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn release(&mut self, handle: ArtifactHandle) {
        assert!(self.live.remove(&handle.id()), "released twice: {handle}");
        self.releases += 1;
    }
}

type Orchestrator = PreviewOrchestrator<MemoryDocument, CountingSurface>;

const DEBOUNCE: Duration = Duration::from_millis(500);

fn settings(save_only: bool) -> PreviewSettings {
    PreviewSettings {
        debounce_milliseconds: 500,
        loop_guard_milliseconds: 100,
        update_on_save_only: save_only,
    }
}

fn orchestrator(doc: &MemoryDocument, save_only: bool) -> Orchestrator {
    PreviewOrchestrator::new(doc.clone(), CountingSurface::default(), settings(save_only))
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn last_document(orch: &Orchestrator) -> &str {
    orch.surface().documents.last().map(String::as_str).unwrap_or("")
}

const PAGE: &str = "```html\n<p>v1</p>\n```\n```ts\nlet n: number = 1;\n```\n";

// =============================================================================
// Activation and debounce
// =============================================================================

#[test]
fn test_activate_renders_immediately() {
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, false);

    orch.on_activate(Instant::now());
    assert_eq!(orch.cycles(), 1);
    assert_eq!(
        orch.last_outcome(),
        Some(&CycleOutcome::Rendered {
            location: "mem:1".into()
        })
    );
    assert_eq!(orch.live_location(), Some("mem:1"));
    assert_eq!(orch.phase(), Phase::Idle);
}

#[test]
fn test_burst_renders_latest_content_once() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, false);
    orch.on_activate(t0);

    for (i, at) in [0u64, 100, 200, 300].into_iter().enumerate() {
        doc.set(&format!("```html\n<p>edit {i}</p>\n```"));
        orch.on_content_changed(ChangeKind::Edit, t0 + ms(at));
        assert!(orch.poll(t0 + ms(at)).is_none());
    }

    assert!(orch.poll(t0 + ms(799)).is_none());
    assert!(orch.poll(t0 + ms(800)).is_some());
    assert_eq!(orch.cycles(), 2);
    assert!(last_document(&orch).contains("<main><p>edit 3</p></main>"));
    assert_eq!(orch.surface().documents.len(), 2);
}

#[test]
fn test_content_read_when_timer_fires() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, false);

    orch.on_content_changed(ChangeKind::Edit, t0);
    doc.set("```html\n<p>late</p>\n```");
    orch.poll(t0 + DEBOUNCE);
    assert!(last_document(&orch).contains("<p>late</p>"));
}

#[test]
fn test_save_only_mode() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, true);
    orch.on_activate(t0);

    orch.on_content_changed(ChangeKind::Edit, t0 + ms(10));
    assert_eq!(orch.next_deadline(), None);
    assert!(orch.poll(t0 + ms(5000)).is_none());

    orch.on_content_changed(ChangeKind::Save, t0 + ms(20));
    assert!(orch.poll(t0 + ms(20)).is_some());
    orch.on_content_changed(ChangeKind::Save, t0 + ms(30));
    assert!(orch.poll(t0 + ms(30)).is_some());
    assert_eq!(orch.cycles(), 3);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_transform_failure_installs_diagnostic() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with("```html\n<p>keep out</p>\n```\n```ts\nfunction (\n```");
    let mut orch = orchestrator(&doc, false);

    orch.on_activate(t0);
    let Some(CycleOutcome::Diagnostic { location, message }) = orch.last_outcome() else {
        panic!("expected diagnostic, got {:?}", orch.last_outcome());
    };
    assert_eq!(location, "mem:1");
    assert!(message.starts_with("Transformation failed"));
    assert!(last_document(&orch).contains("color: red"));
    assert!(!last_document(&orch).contains("keep out"));

    // a failed cycle is not retried on its own
    assert_eq!(orch.phase(), Phase::Idle);
    assert!(orch.poll(t0 + ms(10_000)).is_none());
}

#[test]
fn test_recovers_after_fixing_source() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with("```ts\nlet = ;\n```");
    let mut orch = orchestrator(&doc, false);
    orch.on_activate(t0);
    assert!(matches!(orch.last_outcome(), Some(CycleOutcome::Diagnostic { .. })));

    doc.set(PAGE);
    orch.on_content_changed(ChangeKind::Save, t0);
    orch.poll(t0 + DEBOUNCE);
    assert!(matches!(orch.last_outcome(), Some(CycleOutcome::Rendered { .. })));
    assert_eq!(orch.surface().live.len(), 1);
}

#[test]
fn test_no_active_document_skips_cycle() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, false);
    orch.on_activate(t0);

    doc.close();
    orch.on_content_changed(ChangeKind::Edit, t0);
    assert_eq!(orch.poll(t0 + DEBOUNCE), Some(CycleOutcome::Skipped));
    assert_eq!(orch.live_location(), Some("mem:1"));
    assert_eq!(orch.surface().releases, 0);
}

#[test]
fn test_surface_failure_does_not_stop_orchestrator() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = PreviewOrchestrator::new(
        doc.clone(),
        CountingSurface {
            fail: true,
            ..CountingSurface::default()
        },
        settings(false),
    );

    orch.on_activate(t0);
    assert!(matches!(orch.last_outcome(), Some(CycleOutcome::SurfaceFailed(_))));
    assert_eq!(orch.live_location(), None);

    orch.on_content_changed(ChangeKind::Edit, t0);
    assert!(orch.poll(t0 + DEBOUNCE).is_some());
    assert_eq!(orch.cycles(), 2);
}

// =============================================================================
// Artifact lifecycle
// =============================================================================

#[test]
fn test_one_live_handle_across_renders_zero_after_teardown() {
    let mut now = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, false);
    orch.on_activate(now);

    for i in 0..5 {
        doc.set(&format!("```html\n<p>{i}</p>\n```"));
        orch.on_content_changed(ChangeKind::Edit, now);
        now += DEBOUNCE;
        orch.poll(now);
        assert_eq!(orch.surface().live.len(), 1);
    }
    assert_eq!(orch.surface().releases, 5);

    orch.on_teardown();
    assert!(orch.surface().live.is_empty());
    assert_eq!(orch.live_location(), None);
    assert!(orch.is_closed());
}

#[test]
fn test_teardown_is_terminal() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, false);
    orch.on_activate(t0);
    orch.on_content_changed(ChangeKind::Edit, t0);
    orch.on_teardown();

    orch.on_content_changed(ChangeKind::Save, t0);
    assert!(orch.poll(t0 + ms(60_000)).is_none());
    orch.on_activate(t0);
    assert_eq!(orch.cycles(), 1);
    orch.on_teardown();
    assert_eq!(orch.surface().releases, 1);
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_apply_settings_rebuilds_budget() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with("```ts\nwhile (true) {}\n```");
    let mut orch = orchestrator(&doc, false);
    orch.on_activate(t0);
    assert!(last_document(&orch).contains("> 100)"));

    orch.apply_settings(PreviewSettings {
        loop_guard_milliseconds: 750,
        debounce_milliseconds: 200,
        update_on_save_only: false,
    });
    orch.on_content_changed(ChangeKind::Edit, t0);
    assert_eq!(orch.next_deadline(), Some(t0 + ms(200)));
    orch.poll(t0 + ms(200));
    assert!(last_document(&orch).contains("> 750)"));
}

#[test]
fn test_apply_settings_switches_to_save_only() {
    let t0 = Instant::now();
    let doc = MemoryDocument::with(PAGE);
    let mut orch = orchestrator(&doc, false);
    orch.apply_settings(settings(true));
    orch.on_content_changed(ChangeKind::Edit, t0);
    assert_eq!(orch.next_deadline(), None);
}
