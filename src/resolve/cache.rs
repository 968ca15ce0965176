//! Session-scoped title → source identifier store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::site::SourceIdentifier;

/// Identifiers resolved during this session, keyed by display title.
///
/// Cheap to clone; clones share the same entries. Once a title has an
/// identifier it keeps it for the lifetime of the cache.
#[derive(Debug, Clone, Default)]
pub struct SourceCache {
    entries: Arc<RwLock<HashMap<String, SourceIdentifier>>>,
}

impl SourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, title: &str) -> Option<SourceIdentifier> {
        self.entries.read().await.get(title.trim()).cloned()
    }

    /// Store `id` for `title` unless one is already present. Returns the
    /// identifier the cache holds afterwards.
    pub async fn insert(&self, title: &str, id: SourceIdentifier) -> SourceIdentifier {
        let mut entries = self.entries.write().await;
        let stored = entries.entry(title.trim().to_string()).or_insert(id);
        debug!(title = %title.trim(), id = %stored, "Cached source identifier");
        stored.clone()
    }

    /// Like [`insert`](Self::insert), but `still_wanted` is checked while the
    /// write lock is held. Returns `None` and leaves the cache untouched when
    /// it says no.
    pub async fn insert_if(
        &self,
        title: &str,
        id: SourceIdentifier,
        still_wanted: impl FnOnce() -> bool,
    ) -> Option<SourceIdentifier> {
        let mut entries = self.entries.write().await;
        if !still_wanted() {
            debug!(title = %title.trim(), "Dropped identifier for a stale request");
            return None;
        }
        let stored = entries.entry(title.trim().to_string()).or_insert(id);
        debug!(title = %title.trim(), id = %stored, "Cached source identifier");
        Some(stored.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
