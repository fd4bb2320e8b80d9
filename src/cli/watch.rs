//! `watch`: keep `<output>/preview-<n>.html` in sync with the document.

use std::path::Path;

use anyhow::Result;
use crossbeam::channel;

use crate::actor::Coordinator;
use crate::config::RawSettings;
use crate::core::register_shutdown;
use crate::log;
use crate::surface::DirSurface;

pub fn watch_file(file: &Path, output: &Path, config: &Path, overrides: RawSettings) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_shutdown(shutdown_tx);

    log!("watch"; "{} → {}", file.display(), output.display());
    Coordinator::new(file, config, overrides)
        .with_shutdown_signal(shutdown_rx)
        .run(DirSurface::new(output))
}
