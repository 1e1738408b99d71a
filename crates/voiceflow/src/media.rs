//! Process-local media references
//!
//! Staged images, recorded clips and backend reply audio live in a
//! [`MediaStore`] and are addressed through opaque [`MediaRef`]s. Whoever owns a
//! reference revokes it once it is no longer displayed.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Opaque handle to a media blob, rendered as `blob:voiceflow/<uuid>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef(Uuid);

impl MediaRef {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:voiceflow/{}", self.0)
    }
}

/// Bytes behind a media reference
#[derive(Debug)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl MediaBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }
}

/// Registry of live media blobs
///
/// Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct MediaStore {
    blobs: Arc<RwLock<HashMap<MediaRef, Arc<MediaBlob>>>>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes and return a fresh reference to them
    pub fn register(&self, bytes: Vec<u8>, mime_type: impl Into<String>) -> MediaRef {
        let media = MediaRef::new();
        let blob = MediaBlob {
            bytes,
            mime_type: mime_type.into(),
            created_at: Utc::now(),
        };
        debug!("Registered {} ({} bytes, {})", media, blob.len(), blob.mime_type);
        self.blobs.write().insert(media.clone(), Arc::new(blob));
        media
    }

    /// Look up a live blob
    pub fn get(&self, media: &MediaRef) -> Option<Arc<MediaBlob>> {
        self.blobs.read().get(media).cloned()
    }

    pub fn contains(&self, media: &MediaRef) -> bool {
        self.blobs.read().contains_key(media)
    }

    /// Release a reference; returns whether it was still live
    pub fn revoke(&self, media: &MediaRef) -> bool {
        let removed = self.blobs.write().remove(media).is_some();
        if removed {
            debug!("Revoked {}", media);
        }
        removed
    }

    /// Number of references not yet revoked
    pub fn live_count(&self) -> usize {
        self.blobs.read().len()
    }

    /// Release everything, returning how many references were live
    pub fn revoke_all(&self) -> usize {
        let mut blobs = self.blobs.write();
        let count = blobs.len();
        blobs.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let store = MediaStore::new();
        let media = store.register(vec![1, 2, 3], "image/png");

        let blob = store.get(&media).unwrap();
        assert_eq!(blob.bytes, vec![1, 2, 3]);
        assert_eq!(blob.mime_type, "image/png");
        assert!(!blob.is_audio());
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let store = MediaStore::new();
        let media = store.register(vec![0; 8], "audio/wav");

        assert!(store.revoke(&media));
        assert!(!store.revoke(&media));
        assert!(store.get(&media).is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_clone_shares_registry() {
        let store = MediaStore::new();
        let other = store.clone();
        let media = store.register(vec![9], "audio/mpeg");

        assert!(other.contains(&media));
        assert_eq!(other.revoke_all(), 1);
        assert!(!store.contains(&media));
    }

    #[test]
    fn test_display_format() {
        let store = MediaStore::new();
        let media = store.register(Vec::new(), "image/jpeg");
        assert!(media.to_string().starts_with("blob:voiceflow/"));
    }
}
