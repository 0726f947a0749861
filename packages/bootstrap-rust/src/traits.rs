use async_trait::async_trait;
use classsync_core::{DocumentReference, PersistedDocument};

/// Pluggable persistence backend for class documents.
/// Implementations: in-memory (tests, dry runs), JSON directory.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a document, or `None` if it has never been saved.
    async fn load(&self, reference: &DocumentReference) -> anyhow::Result<Option<PersistedDocument>>;

    /// Persist a document. The stored copy is no longer new afterwards.
    async fn save(&self, document: &PersistedDocument) -> anyhow::Result<()>;

    /// One-time initialization (e.g., create directories).
    async fn initialize(&self) -> anyhow::Result<()>;
}
