use classsync_core::{DocumentReference, LocalReference, ReconcileError, SchemaError};

/// Errors raised while initializing mandatory documents.
///
/// Per-document variants are recorded in the wiki report; they never abort
/// the remaining documents.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to load {reference}")]
    Load {
        reference: DocumentReference,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to save {reference}")]
    Save {
        reference: DocumentReference,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to reconcile {reference}")]
    Reconcile {
        reference: DocumentReference,
        #[source]
        source: ReconcileError,
    },
    #[error("document {reference} is registered twice")]
    DuplicateRegistration { reference: LocalReference },
    #[error("invalid built-in schema")]
    Schema(#[from] SchemaError),
}
