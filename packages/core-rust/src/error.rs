/// Errors raised while building a [`SchemaTarget`](crate::SchemaTarget).
///
/// These are programming errors in a schema declaration and surface when the
/// declaration is built, never during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("class {class} declares field {field:?} more than once")]
    DuplicateField { class: String, field: String },
    #[error("invalid field name {name:?}")]
    InvalidFieldName { name: String },
    #[error("malformed field {field:?}: {reason}")]
    MalformedFieldSpec { field: String, reason: String },
    #[error("sheet {sheet} is both required and obsolete")]
    SheetConflict { sheet: String },
}

/// Errors returned by [`reconcile`](crate::reconcile::reconcile).
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The execution context could not tell whether the wiki is the primary one.
    /// No mutation has been applied.
    #[error("cannot determine whether wiki {wiki:?} is the primary wiki")]
    ApplicabilityLookup {
        wiki: String,
        #[source]
        source: anyhow::Error,
    },
}
