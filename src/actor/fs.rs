//! FileSystem Actor
//!
//! Watches the previewed document and the settings file and forwards
//! changes to the preview actor. Timing is left to the orchestrator's
//! debounce; this actor only filters and classifies.
//!
//! Parent directories are watched rather than the files themselves, so
//! editors that save by write-then-rename are still observed.

use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::messages::PreviewMsg;
use crate::preview::ChangeKind;

/// Check if path is a temp/backup file (editor artifacts)
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Absolute form of `path` without requiring it to exist.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Files of interest.
#[derive(Debug, Clone)]
pub struct WatchTargets {
    document: PathBuf,
    config: Option<PathBuf>,
}

impl WatchTargets {
    pub fn new(document: &Path, config: Option<&Path>) -> Self {
        Self {
            document: absolute(document),
            config: config.map(absolute),
        }
    }

    /// Directories to register with the watcher.
    fn roots(&self) -> FxHashSet<PathBuf> {
        std::iter::once(&self.document)
            .chain(&self.config)
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .filter(|dir| dir.is_dir())
            .collect()
    }

    /// Map a notify event to a preview message.
    fn classify(&self, event: &notify::Event) -> Option<PreviewMsg> {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // Ignore metadata-only changes (mtime/atime/chmod noise)
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return None,
            EventKind::Modify(_) => {}
            _ => return None,
        }

        let mut result = None;
        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            let path = absolute(path);
            if path == self.document {
                return Some(PreviewMsg::Changed(ChangeKind::Save));
            }
            if self.config.as_ref() == Some(&path) {
                result = Some(PreviewMsg::ConfigChanged);
            }
        }
        result
    }
}

/// FileSystem Actor - watches the document and settings file
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle; dropping it unregisters the change handler
    _watcher: RecommendedWatcher,
    targets: WatchTargets,
    preview_tx: mpsc::Sender<PreviewMsg>,
}

impl FsActor {
    /// Start watching immediately; events buffer until `run`.
    pub fn new(targets: WatchTargets, preview_tx: mpsc::Sender<PreviewMsg>) -> notify::Result<Self> {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        for root in targets.roots() {
            crate::debug!("watch"; "watching {}", root.display());
            watcher.watch(&root, RecursiveMode::NonRecursive)?;
        }

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            targets,
            preview_tx,
        })
    }

    /// Forward classified events on a dedicated thread.
    ///
    /// The thread exits once the preview actor drops its receiver.
    pub fn spawn(self) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let Self {
                notify_rx,
                _watcher,
                targets,
                preview_tx,
            } = self;

            while let Ok(result) = notify_rx.recv() {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        crate::log!("watch"; "notify error: {}", e);
                        continue;
                    }
                };
                crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

                let Some(msg) = targets.classify(&event) else {
                    continue;
                };
                if preview_tx.blocking_send(msg).is_err() {
                    break; // Receiver dropped
                }
            }
            drop(_watcher);
        })
    }
}
