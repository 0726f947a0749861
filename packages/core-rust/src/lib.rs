//! `classsync` core — class schema declarations and idempotent reconciliation
//! of mandatory class documents.

pub mod catalog;
pub mod context;
pub mod document;
pub mod error;
pub mod field;
pub mod reconcile;
pub mod schema;
pub mod types;

pub use context::{ExecutionContext, WikiContext};
pub use document::{PersistedDocument, PersistedField};
pub use error::{ReconcileError, SchemaError};
pub use field::{BooleanDefault, FieldKind, FieldKindTag, NumberType};
pub use reconcile::{reconcile, Change, ReconciliationResult};
pub use schema::{FieldSpec, SchemaTarget, SchemaTargetBuilder};
pub use types::{DocumentReference, LocalReference};
