//! Actor Coordinator - wires the watcher to the preview actor
//!
//! ```text
//! FsActor (thread) --PreviewMsg--> PreviewActor (current-thread tokio)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, WatchTargets};
use super::preview::PreviewActor;
use crate::config::{RawSettings, settings};
use crate::preview::{DocumentSource, FileDocument, PreviewOrchestrator, RenderSurface};

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the preview loop for one document.
pub struct Coordinator {
    document: PathBuf,
    config_path: PathBuf,
    overrides: RawSettings,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(document: &Path, config_path: &Path, overrides: RawSettings) -> Self {
        Self {
            document: document.to_path_buf(),
            config_path: config_path.to_path_buf(),
            overrides,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the preview loop on `surface` until shutdown.
    ///
    /// Blocks the calling thread. The live artifact is released and the
    /// watcher dropped before returning.
    pub fn run<S: RenderSurface>(self, surface: S) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("failed to start preview runtime")?;

        let (preview_tx, preview_rx) = mpsc::channel(CHANNEL_BUFFER);
        let targets = WatchTargets::new(&self.document, Some(&self.config_path));
        let fs_actor = FsActor::new(targets, preview_tx)
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
        let watcher = fs_actor.spawn();

        let document = FileDocument::new(&self.document);
        let name = document.name();
        if document.read().is_none() {
            crate::log!("warning"; "{} does not exist yet, waiting for it", self.document.display());
        }
        let orchestrator = PreviewOrchestrator::new(document, surface, *settings());

        let mut actor = PreviewActor::new(orchestrator, preview_rx, self.config_path, self.overrides, name);
        if let Some(rx) = self.shutdown_rx {
            actor = actor.with_shutdown_signal(rx);
        }

        crate::debug!("actor"; "start");
        let orchestrator = runtime.block_on(actor.run());
        crate::debug!("actor"; "stopped after {} cycles", orchestrator.cycles());

        // The receiver is gone; the watcher thread exits on its next event.
        drop(watcher);
        Ok(())
    }
}
