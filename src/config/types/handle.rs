//! Global settings with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic replacement, so the
//! preview loop picks up edits to the settings file while running.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use anyhow::Result;
use arc_swap::ArcSwap;

use crate::config::{PreviewSettings, RawSettings};

/// Global settings storage.
pub static SETTINGS: LazyLock<ArcSwap<PreviewSettings>> =
    LazyLock::new(|| ArcSwap::from_pointee(PreviewSettings::default()));

/// Hash of the settings file content last loaded.
static SETTINGS_HASH: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn settings() -> Arc<PreviewSettings> {
    SETTINGS.load_full()
}

#[inline]
pub fn init_settings(settings: PreviewSettings, path: &Path) -> Arc<PreviewSettings> {
    if let Ok(content) = std::fs::read(path) {
        SETTINGS_HASH.store(content_hash(&content), Ordering::Relaxed);
    }
    let arc = Arc::new(settings);
    SETTINGS.store(Arc::clone(&arc));
    arc
}

/// Reload settings from disk if the file content changed.
///
/// CLI overrides are re-applied on top of the file. Returns `Ok(None)`
/// when the content is unchanged.
pub fn reload_settings(path: &Path, overrides: &RawSettings) -> Result<Option<Arc<PreviewSettings>>> {
    let content = std::fs::read(path).unwrap_or_default();
    let new_hash = content_hash(&content);
    if new_hash == SETTINGS_HASH.load(Ordering::Relaxed) {
        return Ok(None);
    }

    let settings = Arc::new(crate::config::load_settings(path, overrides)?);
    SETTINGS.store(Arc::clone(&settings));
    SETTINGS_HASH.store(new_hash, Ordering::Relaxed);
    Ok(Some(settings))
}

fn content_hash(content: &[u8]) -> u64 {
    let hash = blake3::hash(content);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reload_only_on_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fenceplay.toml");
        std::fs::write(&path, "debounce_milliseconds = 300\n").unwrap();

        let loaded = crate::config::load_settings(&path, &RawSettings::default()).unwrap();
        init_settings(loaded, &path);
        assert_eq!(settings().debounce_milliseconds, 300);

        assert!(reload_settings(&path, &RawSettings::default()).unwrap().is_none());

        std::fs::write(&path, "debounce_milliseconds = 700\n").unwrap();
        let reloaded = reload_settings(&path, &RawSettings::default()).unwrap().unwrap();
        assert_eq!(reloaded.debounce_milliseconds, 700);
        assert_eq!(settings().debounce_milliseconds, 700);
    }
}
