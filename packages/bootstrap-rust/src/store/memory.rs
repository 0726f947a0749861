//! In-memory [`DocumentStore`] backed by [`DashMap`].
//!
//! Keeps every saved document in process memory and records the order of
//! saves, which tests use to assert that clean documents are never written.

use async_trait::async_trait;
use classsync_core::{DocumentReference, PersistedDocument};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::traits::DocumentStore;

/// Document store living entirely in memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<DocumentReference, PersistedDocument>,
    save_log: Mutex<Vec<DocumentReference>>,
}

impl MemoryDocumentStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document as if it had been saved earlier. Not recorded in the save log.
    pub fn insert(&self, mut document: PersistedDocument) {
        document.mark_saved();
        self.documents.insert(document.reference.clone(), document);
    }

    /// Snapshot of a stored document.
    #[must_use]
    pub fn get(&self, reference: &DocumentReference) -> Option<PersistedDocument> {
        self.documents.get(reference).map(|entry| entry.value().clone())
    }

    /// References passed to [`DocumentStore::save`], in call order.
    #[must_use]
    pub fn saves(&self) -> Vec<DocumentReference> {
        self.save_log.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self, reference: &DocumentReference) -> anyhow::Result<Option<PersistedDocument>> {
        Ok(self.get(reference))
    }

    async fn save(&self, document: &PersistedDocument) -> anyhow::Result<()> {
        let mut stored = document.clone();
        stored.mark_saved();
        self.documents.insert(stored.reference.clone(), stored);
        self.save_log.lock().push(document.reference.clone());
        Ok(())
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use classsync_core::LocalReference;

    use super::*;

    fn reference() -> DocumentReference {
        DocumentReference::new("xwiki", LocalReference::new("XWiki", "XWikiUsers"))
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let store = MemoryDocumentStore::new();
        assert!(store.load(&reference()).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_clears_new_flag() {
        let store = MemoryDocumentStore::new();
        let doc = PersistedDocument::new(reference());
        assert!(doc.is_new);

        store.save(&doc).await.unwrap();

        let loaded = store.load(&reference()).await.unwrap().unwrap();
        assert!(!loaded.is_new);
        assert_eq!(store.saves(), vec![reference()]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_is_not_logged_as_save() {
        let store = MemoryDocumentStore::new();
        store.insert(PersistedDocument::new(reference()));
        assert!(store.saves().is_empty());
        assert!(!store.get(&reference()).unwrap().is_new);
    }
}
