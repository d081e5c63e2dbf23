//! Ephemeral image handles.
//!
//! A [`BlobStore`] holds in-memory image bytes behind short-lived
//! [`ImageHandle`]s, the way a browser holds blobs behind object URLs.
//! Handles are never persisted. Ownership is explicit: whoever replaces a
//! handle revokes the old one, and nothing is reference counted.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque reference to image bytes held by a [`BlobStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageHandle(u64);

impl ImageHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:photopost/{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("image handle {0} is not live")]
    NotLive(ImageHandle),
}

#[derive(Debug, Clone)]
struct Blob {
    mime_type: String,
    bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: u64,
    blobs: HashMap<ImageHandle, Blob>,
}

/// Shared, cheaply clonable store of image bytes.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A panic while holding the lock cannot leave the map half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register bytes and return a fresh handle to them.
    pub fn create(&self, mime_type: &str, bytes: impl Into<Arc<[u8]>>) -> ImageHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let handle = ImageHandle(inner.next_id);
        inner.blobs.insert(
            handle,
            Blob {
                mime_type: mime_type.to_string(),
                bytes: bytes.into(),
            },
        );
        handle
    }

    /// Bytes behind a live handle.
    pub fn fetch(&self, handle: ImageHandle) -> Result<Arc<[u8]>, StoreError> {
        self.lock()
            .blobs
            .get(&handle)
            .map(|blob| Arc::clone(&blob.bytes))
            .ok_or(StoreError::NotLive(handle))
    }

    pub fn mime_type(&self, handle: ImageHandle) -> Option<String> {
        self.lock()
            .blobs
            .get(&handle)
            .map(|blob| blob.mime_type.clone())
    }

    /// Release the bytes behind `handle`. Returns false if it was not live.
    pub fn revoke(&self, handle: ImageHandle) -> bool {
        let revoked = self.lock().blobs.remove(&handle).is_some();
        if revoked {
            tracing::trace!(%handle, "revoked image handle");
        }
        revoked
    }

    pub fn is_live(&self, handle: ImageHandle) -> bool {
        self.lock().blobs.contains_key(&handle)
    }

    /// Number of handles currently holding bytes.
    pub fn live_count(&self) -> usize {
        self.lock().blobs.len()
    }
}
