//! Startup loop that keeps mandatory class documents in line with their schemas.
//!
//! For every registered document, in order: load it (or start a new one),
//! [`reconcile`] it, and save it only when the reconciliation reports dirty.
//! Wikis and documents are processed sequentially, so each document has a
//! single writer for the duration of its reconcile-then-save step.

use std::sync::Arc;

use classsync_core::{
    reconcile, Change, DocumentReference, ExecutionContext, PersistedDocument, WikiContext,
};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{BootstrapConfig, StoreConfig};
use crate::error::BootstrapError;
use crate::registry::{MandatoryDocument, MandatoryDocumentRegistry};
use crate::store::{DirectoryDocumentStore, MemoryDocumentStore};
use crate::traits::DocumentStore;

/// What happened to one mandatory document.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// The document did not exist and was saved for the first time.
    Created { changes: Vec<Change> },
    /// The document drifted from its schema and was saved.
    Updated { changes: Vec<Change> },
    /// Already in line with its schema; not written.
    Unchanged,
    /// The schema does not apply to this wiki.
    Skipped,
    Failed { error: BootstrapError },
}

impl DocumentOutcome {
    /// Whether the document was written.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Updated { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-wiki summary of a bootstrap run.
#[derive(Debug)]
pub struct WikiReport {
    pub wiki: String,
    /// One entry per registered document, in registration order.
    pub documents: Vec<(DocumentReference, DocumentOutcome)>,
}

impl WikiReport {
    /// Number of documents written.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.documents.iter().filter(|(_, o)| o.is_saved()).count()
    }

    /// Number of documents that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.documents.iter().filter(|(_, o)| o.is_failed()).count()
    }

    #[must_use]
    pub fn outcome(&self, reference: &DocumentReference) -> Option<&DocumentOutcome> {
        self.documents
            .iter()
            .find(|(r, _)| r == reference)
            .map(|(_, o)| o)
    }
}

/// Drives reconciliation of every registered document against a store.
pub struct Bootstrapper {
    store: Arc<dyn DocumentStore>,
    registry: Arc<MandatoryDocumentRegistry>,
    primary_wiki: String,
}

impl Bootstrapper {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        registry: Arc<MandatoryDocumentRegistry>,
        primary_wiki: impl Into<String>,
    ) -> Self {
        Self {
            store,
            registry,
            primary_wiki: primary_wiki.into(),
        }
    }

    /// Builds a bootstrapper over the configured store and the built-in registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in schema is invalid or the store cannot
    /// be initialized.
    pub async fn from_config(config: &BootstrapConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.store {
            StoreConfig::Memory => Arc::new(MemoryDocumentStore::new()),
            StoreConfig::Directory(root) => Arc::new(DirectoryDocumentStore::new(root.clone())),
        };
        store.initialize().await?;
        let registry = MandatoryDocumentRegistry::with_builtin()?;
        Ok(Self::new(store, Arc::new(registry), config.primary_wiki.clone()))
    }

    #[must_use]
    pub fn registry(&self) -> &MandatoryDocumentRegistry {
        &self.registry
    }

    /// Initializes every wiki in order.
    pub async fn initialize_all(&self, wikis: &[String]) -> Vec<WikiReport> {
        let mut reports = Vec::with_capacity(wikis.len());
        for wiki in wikis {
            reports.push(self.initialize_wiki(wiki).await);
        }
        reports
    }

    /// Initializes the mandatory documents of one wiki.
    pub async fn initialize_wiki(&self, wiki: &str) -> WikiReport {
        let ctx = WikiContext::new(wiki, self.primary_wiki.clone());
        self.initialize_with(&ctx).await
    }

    /// Initializes the mandatory documents of the wiki described by `ctx`.
    ///
    /// A failing document is recorded and the loop moves on to the next one.
    pub async fn initialize_with(&self, ctx: &(dyn ExecutionContext + Sync)) -> WikiReport {
        let wiki = ctx.current_wiki_id().to_string();
        let span = info_span!("initialize_wiki", wiki = %wiki);
        async {
            let mut documents = Vec::with_capacity(self.registry.len());
            for mandatory in self.registry.iter() {
                let reference = DocumentReference::new(wiki.clone(), mandatory.reference.clone());
                let outcome = match self.initialize_document(mandatory, &reference, ctx).await {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        warn!(document = %reference, error = %error, "mandatory document failed");
                        DocumentOutcome::Failed { error }
                    }
                };
                documents.push((reference, outcome));
            }
            let report = WikiReport { wiki, documents };
            info!(
                saved = report.saved(),
                failed = report.failed(),
                total = report.documents.len(),
                "mandatory documents initialized"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn initialize_document(
        &self,
        mandatory: &MandatoryDocument,
        reference: &DocumentReference,
        ctx: &(dyn ExecutionContext + Sync),
    ) -> Result<DocumentOutcome, BootstrapError> {
        let mut document = self
            .store
            .load(reference)
            .await
            .map_err(|source| BootstrapError::Load {
                reference: reference.clone(),
                source,
            })?
            .unwrap_or_else(|| PersistedDocument::new(reference.clone()));

        let result = reconcile(&mandatory.target, &mut document, ctx).map_err(|source| {
            BootstrapError::Reconcile {
                reference: reference.clone(),
                source,
            }
        })?;

        if !result.applicable {
            debug!(document = %reference, "not applicable to this wiki");
            return Ok(DocumentOutcome::Skipped);
        }
        if !result.dirty {
            return Ok(DocumentOutcome::Unchanged);
        }

        let created = document.is_new;
        self.store
            .save(&document)
            .await
            .map_err(|source| BootstrapError::Save {
                reference: reference.clone(),
                source,
            })?;
        info!(
            document = %reference,
            created,
            changes = result.changes.len(),
            "mandatory document saved"
        );

        let changes = result.changes;
        Ok(if created {
            DocumentOutcome::Created { changes }
        } else {
            DocumentOutcome::Updated { changes }
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use classsync_core::{FieldKindTag, FieldSpec, LocalReference, PersistedField, SchemaTarget};

    use super::*;

    fn users_ref(wiki: &str) -> DocumentReference {
        DocumentReference::new(wiki, LocalReference::new("XWiki", "XWikiUsers"))
    }

    fn builtin_over(store: Arc<dyn DocumentStore>) -> Bootstrapper {
        let registry = MandatoryDocumentRegistry::with_builtin().unwrap();
        Bootstrapper::new(store, Arc::new(registry), "xwiki")
    }

    #[tokio::test]
    async fn first_boot_creates_every_document() {
        let store = Arc::new(MemoryDocumentStore::new());
        let bootstrapper = builtin_over(store.clone());

        let report = bootstrapper.initialize_wiki("xwiki").await;

        assert_eq!(report.failed(), 0);
        assert_eq!(report.saved(), bootstrapper.registry().len());
        assert!(matches!(
            report.outcome(&users_ref("xwiki")),
            Some(DocumentOutcome::Created { .. })
        ));
        let users = store.get(&users_ref("xwiki")).unwrap();
        assert!(!users.is_new);
        assert_eq!(users.content, "1 XWiki Users");
        assert!(users.hidden);
    }

    #[tokio::test]
    async fn second_boot_writes_nothing() {
        let store = Arc::new(MemoryDocumentStore::new());
        let bootstrapper = builtin_over(store.clone());
        bootstrapper.initialize_wiki("xwiki").await;
        let saves_after_first = store.saves().len();

        let report = bootstrapper.initialize_wiki("xwiki").await;

        assert_eq!(report.saved(), 0);
        assert!(report
            .documents
            .iter()
            .all(|(_, o)| matches!(o, DocumentOutcome::Unchanged)));
        assert_eq!(store.saves().len(), saves_after_first);
    }

    #[tokio::test]
    async fn drifted_document_is_updated() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut legacy = PersistedDocument::new(users_ref("xwiki"));
        legacy.put_field(PersistedField::from_spec(&FieldSpec::text("email", "e-Mail", 30), 1));
        legacy.put_field(PersistedField::from_spec(&FieldSpec::text("nickname", "Nickname", 20), 2));
        store.insert(legacy);
        let bootstrapper = builtin_over(store.clone());

        let report = bootstrapper.initialize_wiki("xwiki").await;

        assert!(matches!(
            report.outcome(&users_ref("xwiki")),
            Some(DocumentOutcome::Updated { .. })
        ));
        let users = store.get(&users_ref("xwiki")).unwrap();
        assert_eq!(users.field("email").unwrap().kind.tag(), FieldKindTag::Email);
        assert!(users.field("nickname").is_some());
    }

    #[tokio::test]
    async fn secondary_wiki_skips_main_wiki_only_documents() {
        let store = Arc::new(MemoryDocumentStore::new());
        let bootstrapper = builtin_over(store.clone());

        let reports = bootstrapper
            .initialize_all(&["xwiki".to_string(), "sub".to_string()])
            .await;

        let global = DocumentReference::new("sub", LocalReference::new("XWiki", "XWikiGlobalRights"));
        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[1].outcome(&global), Some(DocumentOutcome::Skipped)));
        assert!(store.get(&global).is_none());
        assert!(store.get(&users_ref("sub")).is_some());
    }

    struct BrokenDirectory;

    impl ExecutionContext for BrokenDirectory {
        fn current_wiki_id(&self) -> &str {
            "sub"
        }

        fn is_primary_wiki(&self) -> anyhow::Result<bool> {
            anyhow::bail!("descriptor lookup timed out")
        }
    }

    #[tokio::test]
    async fn failed_lookup_only_fails_gated_documents() {
        let store = Arc::new(MemoryDocumentStore::new());
        let bootstrapper = builtin_over(store.clone());

        let report = bootstrapper.initialize_with(&BrokenDirectory).await;

        let global = DocumentReference::new("sub", LocalReference::new("XWiki", "XWikiGlobalRights"));
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcome(&global),
            Some(DocumentOutcome::Failed {
                error: BootstrapError::Reconcile { .. }
            })
        ));
        assert!(store.get(&users_ref("sub")).is_some());
    }

    /// Store whose saves fail for one page.
    struct FlakyStore {
        inner: MemoryDocumentStore,
        failing_page: &'static str,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn load(&self, reference: &DocumentReference) -> anyhow::Result<Option<PersistedDocument>> {
            self.inner.load(reference).await
        }

        async fn save(&self, document: &PersistedDocument) -> anyhow::Result<()> {
            if document.reference.local.page == self.failing_page {
                anyhow::bail!("disk full");
            }
            self.inner.save(document).await
        }

        async fn initialize(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn save_failure_does_not_stop_other_documents() {
        let store = Arc::new(FlakyStore {
            inner: MemoryDocumentStore::new(),
            failing_page: "XWikiUsers",
        });
        let bootstrapper = builtin_over(store.clone());

        let report = bootstrapper.initialize_wiki("xwiki").await;

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcome(&users_ref("xwiki")),
            Some(DocumentOutcome::Failed {
                error: BootstrapError::Save { .. }
            })
        ));
        assert_eq!(report.saved(), bootstrapper.registry().len() - 1);
    }

    #[tokio::test]
    async fn clean_new_document_is_not_saved() {
        let mut registry = MandatoryDocumentRegistry::new();
        registry
            .register(
                LocalReference::new("XWiki", "Empty"),
                SchemaTarget::builder("XWiki.Empty").build().unwrap(),
            )
            .unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let bootstrapper = Bootstrapper::new(store.clone(), Arc::new(registry), "xwiki");

        let report = bootstrapper.initialize_wiki("xwiki").await;

        assert_eq!(report.saved(), 0);
        assert!(store.saves().is_empty());
    }

    #[tokio::test]
    async fn directory_store_from_config_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = BootstrapConfig {
            store: StoreConfig::Directory(dir.path().to_path_buf()),
            ..BootstrapConfig::default()
        };

        let first = Bootstrapper::from_config(&config).await.unwrap();
        let report = first.initialize_wiki("xwiki").await;
        assert_eq!(report.failed(), 0);
        assert!(report.saved() > 0);

        let second = Bootstrapper::from_config(&config).await.unwrap();
        let report = second.initialize_wiki("xwiki").await;
        assert_eq!(report.saved(), 0);
        assert_eq!(report.failed(), 0);
    }
}
