// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Byte-stream handle registry.
//
// Finished documents and opened uploads live here behind opaque handles so the
// pipeline and the viewer can pass them around without copying. Whoever
// creates a handle owns it and must revoke it; a handle that is never revoked
// keeps its bytes alive for the lifetime of the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

/// Opaque reference to a byte stream held by a [`BlobStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobHandle(Uuid);

impl std::fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// Shared registry of immutable byte streams.
///
/// Cloning the store yields another view of the same registry.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    blobs: Arc<Mutex<HashMap<BlobHandle, Arc<[u8]>>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BlobHandle, Arc<[u8]>>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register `bytes` and return a fresh handle owned by the caller.
    pub fn create(&self, bytes: Vec<u8>) -> BlobHandle {
        let handle = BlobHandle(Uuid::new_v4());
        let len = bytes.len();
        self.lock().insert(handle, Arc::from(bytes));
        debug!(%handle, len, "blob created");
        handle
    }

    /// Borrow the bytes behind a handle, if it is still live.
    pub fn get(&self, handle: &BlobHandle) -> Option<Arc<[u8]>> {
        self.lock().get(handle).cloned()
    }

    /// Release a handle. Returns `false` if it was already revoked.
    pub fn revoke(&self, handle: &BlobHandle) -> bool {
        let removed = self.lock().remove(handle).is_some();
        if removed {
            debug!(%handle, "blob revoked");
        } else {
            warn!(%handle, "revoke of unknown blob handle");
        }
        removed
    }

    pub fn contains(&self, handle: &BlobHandle) -> bool {
        self.lock().contains_key(handle)
    }

    /// Number of handles not yet revoked.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoke_releases_bytes() {
        let store = BlobStore::new();
        let handle = store.create(b"%PDF-1.5".to_vec());
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.get(&handle).as_deref(), Some(&b"%PDF-1.5"[..]));

        assert!(store.revoke(&handle));
        assert_eq!(store.live_count(), 0);
        assert!(store.get(&handle).is_none());
        assert!(!store.revoke(&handle));
    }

    #[test]
    fn clones_share_one_registry() {
        let store = BlobStore::new();
        let view = store.clone();
        let handle = store.create(vec![1, 2, 3]);
        assert!(view.contains(&handle));
        view.revoke(&handle);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn handle_displays_as_blob_url() {
        let store = BlobStore::new();
        let handle = store.create(Vec::new());
        assert!(handle.to_string().starts_with("blob:"));
    }
}
