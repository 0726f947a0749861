//! Idempotent reconciliation of a class document against its [`SchemaTarget`].
//!
//! [`reconcile`] compares a [`PersistedDocument`] with a target and applies
//! only the corrections needed, in a fixed order:
//!
//! 1. applicability gate (main-wiki-only schemas on secondary wikis),
//! 2. field diff and merge, then explicit field removals,
//! 3. new-document defaults,
//! 4. document metadata (syntax, hidden flag, custom mapping),
//! 5. sheet bindings.
//!
//! The returned [`ReconciliationResult`] is dirty iff the document must be
//! saved. In steady state a run applies nothing and reports clean, so callers
//! can skip the write.

use serde::Serialize;
use tracing::{debug, trace};

use crate::context::ExecutionContext;
use crate::document::{PersistedDocument, PersistedField};
use crate::error::ReconcileError;
use crate::field::{FieldKind, FieldKindTag};
use crate::schema::{FieldSpec, SchemaTarget};
use crate::types::LocalReference;

/// One mutation applied to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    FieldAdded { field: String, kind: FieldKindTag },
    /// Existing field had another kind; it was dropped and recreated.
    FieldReplaced {
        field: String,
        from: FieldKindTag,
        to: FieldKindTag,
    },
    ParameterUpdated { field: String, parameter: &'static str },
    FieldRemoved { field: String },
    ContentInitialized,
    TitleInitialized,
    EditModeInitialized,
    SyntaxUpdated { from: String, to: String },
    HiddenUpdated { hidden: bool },
    CustomMappingUpdated { mapping: String },
    SheetBound { sheet: LocalReference },
    SheetUnbound { sheet: LocalReference },
}

impl Change {
    /// Whether this change alone requires the document to be saved.
    ///
    /// New-document defaults do not: a new document is persisted anyway.
    #[must_use]
    pub fn marks_dirty(&self) -> bool {
        !matches!(
            self,
            Self::ContentInitialized | Self::TitleInitialized | Self::EditModeInitialized
        )
    }
}

/// Outcome of one [`reconcile`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// The document was mutated and must be saved by the caller.
    pub dirty: bool,
    /// False when the schema does not apply to the current wiki.
    pub applicable: bool,
    /// Applied mutations, in application order.
    pub changes: Vec<Change>,
}

impl ReconciliationResult {
    fn applicable() -> Self {
        Self {
            dirty: false,
            applicable: true,
            changes: Vec::new(),
        }
    }

    fn not_applicable() -> Self {
        Self::default()
    }

    fn record(&mut self, document: &PersistedDocument, change: Change) {
        debug!(document = %document.reference, ?change, "applied change");
        self.dirty |= change.marks_dirty();
        self.changes.push(change);
    }
}

/// Brings `document` in line with `target`.
///
/// # Errors
///
/// Returns [`ReconcileError::ApplicabilityLookup`] when `target` is main-wiki-only
/// and `ctx` cannot tell whether the current wiki is primary. The document is
/// untouched in that case.
pub fn reconcile(
    target: &SchemaTarget,
    document: &mut PersistedDocument,
    ctx: &dyn ExecutionContext,
) -> Result<ReconciliationResult, ReconcileError> {
    if target.main_wiki_only {
        let primary = ctx
            .is_primary_wiki()
            .map_err(|source| ReconcileError::ApplicabilityLookup {
                wiki: ctx.current_wiki_id().to_string(),
                source,
            })?;
        if !primary {
            trace!(
                class = target.class_name(),
                wiki = ctx.current_wiki_id(),
                "schema applies to the main wiki only, skipping"
            );
            return Ok(ReconciliationResult::not_applicable());
        }
    }

    let mut result = ReconciliationResult::applicable();
    merge_fields(target, document, &mut result);
    apply_new_document_defaults(target, document, &mut result);
    reconcile_metadata(target, document, &mut result);
    reconcile_sheets(target, document, &mut result);
    Ok(result)
}

fn merge_fields(
    target: &SchemaTarget,
    document: &mut PersistedDocument,
    result: &mut ReconciliationResult,
) {
    for spec in &target.fields {
        let changes = match document.fields.get_mut(&spec.name) {
            None => {
                let number = document.next_field_number();
                document.put_field(PersistedField::from_spec(spec, number));
                vec![Change::FieldAdded {
                    field: spec.name.clone(),
                    kind: spec.kind.tag(),
                }]
            }
            Some(existing) if existing.kind.tag() != spec.kind.tag() => {
                let from = existing.kind.tag();
                *existing = PersistedField::from_spec(spec, existing.number);
                vec![Change::FieldReplaced {
                    field: spec.name.clone(),
                    from,
                    to: spec.kind.tag(),
                }]
            }
            Some(existing) => sync_kind(&mut existing.kind, spec)
                .into_iter()
                .map(|parameter| Change::ParameterUpdated {
                    field: spec.name.clone(),
                    parameter,
                })
                .collect(),
        };
        for change in changes {
            result.record(document, change);
        }
    }

    for name in &target.removed_fields {
        if document.remove_field(name).is_some() {
            result.record(document, Change::FieldRemoved { field: name.clone() });
        }
    }
}

/// Overwrites each listed parameter of `$current` that differs from `$spec`.
macro_rules! sync_params {
    ($current:expr, $spec:expr, $changed:ident; $($param:ident),+ $(,)?) => {
        $(
            if $current.$param != $spec.$param {
                $current.$param.clone_from(&$spec.$param);
                $changed.push(stringify!($param));
            }
        )+
    };
}

/// Aligns the parameters of two fields of the same kind.
/// Returns the names of the parameters that were overwritten.
fn sync_kind(current: &mut FieldKind, spec: &FieldSpec) -> Vec<&'static str> {
    let mut changed = Vec::new();
    match (current, &spec.kind) {
        (FieldKind::Text(cur), FieldKind::Text(want)) => {
            sync_params!(cur, want, changed; size, default);
        }
        (FieldKind::TextArea(cur), FieldKind::TextArea(want))
        | (FieldKind::Template(cur), FieldKind::Template(want)) => {
            sync_params!(cur, want, changed; size, rows, default);
        }
        (FieldKind::Boolean(cur), FieldKind::Boolean(want)) => {
            sync_params!(cur, want, changed; display_type);
            if cur.default.encode() != want.default.encode() {
                cur.default = want.default;
                changed.push("default");
            }
        }
        (FieldKind::Number(cur), FieldKind::Number(want)) => {
            sync_params!(cur, want, changed; size, number_type, default);
        }
        (FieldKind::Password(cur), FieldKind::Password(want))
        | (FieldKind::Timezone(cur), FieldKind::Timezone(want))
        | (FieldKind::Email(cur), FieldKind::Email(want)) => {
            sync_params!(cur, want, changed; size);
        }
        (FieldKind::StaticList(cur), FieldKind::StaticList(want)) => {
            sync_params!(
                cur, want, changed;
                size, multi_select, relational_storage, values, separators, display_type, default,
            );
        }
        (FieldKind::DbList(cur), FieldKind::DbList(want)) => {
            sync_params!(cur, want, changed; size, multi_select, relational_storage, sql);
        }
        (FieldKind::Page(cur), FieldKind::Page(want))
        | (FieldKind::Users(cur), FieldKind::Users(want))
        | (FieldKind::Groups(cur), FieldKind::Groups(want))
        | (FieldKind::Levels(cur), FieldKind::Levels(want)) => {
            sync_params!(cur, want, changed; size, multi_select);
        }
        // Kind changes are resolved by replacement before parameters are compared.
        _ => {}
    }
    changed
}

fn apply_new_document_defaults(
    target: &SchemaTarget,
    document: &mut PersistedDocument,
    result: &mut ReconciliationResult,
) {
    if !document.is_new {
        return;
    }
    if document.content.is_empty() {
        document.content = target.default_content();
        result.record(document, Change::ContentInitialized);
    }
    if let Some(title) = target.default_title() {
        if document.title.as_deref() != Some(title) {
            document.title = Some(title.to_string());
            result.record(document, Change::TitleInitialized);
        }
    }
    if let Some(mode) = target.default_edit_mode() {
        if document.default_edit_mode.as_deref() != Some(mode) {
            document.default_edit_mode = Some(mode.to_string());
            result.record(document, Change::EditModeInitialized);
        }
    }
}

fn reconcile_metadata(
    target: &SchemaTarget,
    document: &mut PersistedDocument,
    result: &mut ReconciliationResult,
) {
    if let Some(syntax) = target.required_syntax() {
        if document.syntax != syntax {
            let from = std::mem::replace(&mut document.syntax, syntax.to_string());
            result.record(
                document,
                Change::SyntaxUpdated {
                    from,
                    to: syntax.to_string(),
                },
            );
        }
    }
    if let Some(hidden) = target.required_hidden() {
        if document.hidden != hidden {
            document.hidden = hidden;
            result.record(document, Change::HiddenUpdated { hidden });
        }
    }
    if let Some(mapping) = target.custom_mapping() {
        if document.custom_mapping.as_deref() != Some(mapping) {
            document.custom_mapping = Some(mapping.to_string());
            result.record(
                document,
                Change::CustomMappingUpdated {
                    mapping: mapping.to_string(),
                },
            );
        }
    }
}

/// Custom bindings win: if any binding is not obsolete, nothing is touched.
fn reconcile_sheets(
    target: &SchemaTarget,
    document: &mut PersistedDocument,
    result: &mut ReconciliationResult,
) {
    let obsolete = target.obsolete_sheets();
    if document
        .sheet_bindings
        .iter()
        .any(|sheet| !obsolete.contains(sheet))
    {
        return;
    }

    let stale: Vec<LocalReference> = document.sheet_bindings.iter().cloned().collect();
    for sheet in stale {
        document.sheet_bindings.remove(&sheet);
        result.record(document, Change::SheetUnbound { sheet });
    }

    if let Some(sheet) = target.required_sheet() {
        if document.sheet_bindings.is_empty() {
            document.sheet_bindings.insert(sheet.clone());
            result.record(
                document,
                Change::SheetBound {
                    sheet: sheet.clone(),
                },
            );
        }
    }
}
