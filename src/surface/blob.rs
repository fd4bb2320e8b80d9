//! In-memory addressable artifacts served under `/blob/<id>`.
//!
//! `BlobStore` is shared between the preview actor (writer) and the HTTP
//! workers (readers). The active pointer is an `ArcSwapOption`, so
//! requests never block on a render.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use dashmap::DashMap;

use crate::preview::{ArtifactHandle, RenderSurface, SurfaceError};
use crate::reload::{ClientHub, ReloadMessage};

/// Route prefix blobs are served under.
pub const BLOB_PREFIX: &str = "/blob/";

/// One rendered document.
#[derive(Debug)]
pub struct Blob {
    pub id: u64,
    pub body: String,
    /// Quoted strong validator derived from the content hash.
    pub etag: String,
}

impl Blob {
    fn new(id: u64, body: &str) -> Self {
        let hash = blake3::hash(body.as_bytes());
        Self {
            id,
            body: body.to_string(),
            etag: format!("\"{}\"", hex::encode(&hash.as_bytes()[..8])),
        }
    }

    pub fn url(&self) -> String {
        url_for(self.id)
    }
}

pub fn url_for(id: u64) -> String {
    format!("{BLOB_PREFIX}{id}")
}

/// Parse `/blob/<id>` into the id.
pub fn parse_url(path: &str) -> Option<u64> {
    path.strip_prefix(BLOB_PREFIX)?.parse().ok()
}

/// Revocable blob storage with a single active entry.
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: DashMap<u64, Arc<Blob>>,
    active: ArcSwapOption<Blob>,
    next: AtomicU64,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, body: &str) -> Arc<Blob> {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let blob = Arc::new(Blob::new(id, body));
        self.blobs.insert(id, Arc::clone(&blob));
        blob
    }

    /// Live blob by id; `None` once revoked.
    pub fn get(&self, id: u64) -> Option<Arc<Blob>> {
        self.blobs.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn active(&self) -> Option<Arc<Blob>> {
        self.active.load_full()
    }

    /// Make `id` the active blob. Fails if it was revoked.
    pub fn activate(&self, id: u64) -> Option<Arc<Blob>> {
        let blob = self.get(id)?;
        self.active.store(Some(Arc::clone(&blob)));
        Some(blob)
    }

    /// Revoke `id`. Returns `true` if it was the active blob.
    pub fn revoke(&self, id: u64) -> bool {
        self.blobs.remove(&id);
        let was_active = self.active().is_some_and(|blob| blob.id == id);
        if was_active {
            self.active.store(None);
        }
        was_active
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// `RenderSurface` over a shared `BlobStore`, announcing changes to the
/// connected shell pages.
pub struct BlobSurface {
    store: Arc<BlobStore>,
    hub: Arc<ClientHub>,
}

impl BlobSurface {
    pub fn new(store: Arc<BlobStore>, hub: Arc<ClientHub>) -> Self {
        Self { store, hub }
    }
}

impl RenderSurface for BlobSurface {
    fn create(&mut self, document: &str) -> Result<ArtifactHandle, SurfaceError> {
        let blob = self.store.insert(document);
        Ok(ArtifactHandle::new(blob.id, blob.url()))
    }

    fn display(&mut self, handle: &ArtifactHandle) -> Result<(), SurfaceError> {
        let blob = self.store.activate(handle.id()).ok_or_else(|| {
            SurfaceError::Unavailable(format!("{} was revoked before display", handle))
        })?;
        self.hub.broadcast(&ReloadMessage::navigate(blob.url()));
        Ok(())
    }

    fn release(&mut self, handle: ArtifactHandle) {
        if self.store.revoke(handle.id()) {
            self.hub.broadcast(&ReloadMessage::Closed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::ArtifactSlot;

    fn surface() -> (Arc<BlobStore>, Arc<ClientHub>, BlobSurface) {
        let store = Arc::new(BlobStore::new());
        let hub = Arc::new(ClientHub::new());
        let surface = BlobSurface::new(Arc::clone(&store), Arc::clone(&hub));
        (store, hub, surface)
    }

    #[test]
    fn test_url_round_trip() {
        assert_eq!(url_for(12), "/blob/12");
        assert_eq!(parse_url("/blob/12"), Some(12));
        assert_eq!(parse_url("/blob/x"), None);
        assert_eq!(parse_url("/other/1"), None);
    }

    #[test]
    fn test_etag_follows_content() {
        let store = BlobStore::new();
        let a = store.insert("same");
        let b = store.insert("same");
        let c = store.insert("different");
        assert_eq!(a.etag, b.etag);
        assert_ne!(a.etag, c.etag);
        assert!(a.etag.starts_with('"') && a.etag.ends_with('"'));
    }

    #[test]
    fn test_install_swaps_active_and_revokes_previous() {
        let (store, hub, mut surface) = surface();
        let mut slot = ArtifactSlot::new();

        slot.install(&mut surface, "<p>1</p>").unwrap();
        slot.install(&mut surface, "<p>2</p>").unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(1).is_none());
        assert_eq!(store.active().unwrap().body, "<p>2</p>");
        assert_eq!(hub.last_message(), Some(ReloadMessage::navigate("/blob/2")));
    }

    #[test]
    fn test_teardown_clears_active_and_announces() {
        let (store, hub, mut surface) = surface();
        let mut slot = ArtifactSlot::new();
        slot.install(&mut surface, "<p>1</p>").unwrap();

        slot.clear(&mut surface);
        assert!(store.is_empty());
        assert!(store.active().is_none());
        assert_eq!(hub.last_message(), Some(ReloadMessage::Closed));
    }

    #[test]
    fn test_display_of_revoked_blob_fails() {
        let (store, _, mut surface) = surface();
        let handle = surface.create("x").unwrap();
        store.revoke(handle.id());
        assert!(matches!(
            surface.display(&handle),
            Err(SurfaceError::Unavailable(_))
        ));
    }
}
