use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::field::FieldKind;
use crate::schema::FieldSpec;
use crate::types::{DocumentReference, LocalReference};

/// Syntax assigned to documents created without an explicit one.
pub const DEFAULT_SYNTAX: &str = "xwiki/2.1";

/// A class field as currently persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedField {
    pub name: String,
    pub pretty_label: String,
    /// 1-based display ordinal; stable across parameter updates and kind changes.
    pub number: u32,
    /// Kind tag and current parameter values.
    pub kind: FieldKind,
}

impl PersistedField {
    /// Materializes a schema field at the given ordinal.
    #[must_use]
    pub fn from_spec(spec: &FieldSpec, number: u32) -> Self {
        Self {
            name: spec.name.clone(),
            pretty_label: spec.pretty_label.clone(),
            number,
            kind: spec.kind.clone(),
        }
    }
}

/// A class-bearing document loaded from, or about to be written to, storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub reference: DocumentReference,
    pub fields: BTreeMap<String, PersistedField>,
    /// True until the document has been saved once.
    pub is_new: bool,
    pub hidden: bool,
    pub syntax: String,
    pub sheet_bindings: BTreeSet<LocalReference>,
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub default_edit_mode: Option<String>,
    #[serde(default)]
    pub custom_mapping: Option<String>,
}

impl PersistedDocument {
    /// A never-saved, empty document.
    #[must_use]
    pub fn new(reference: DocumentReference) -> Self {
        Self {
            reference,
            fields: BTreeMap::new(),
            is_new: true,
            hidden: false,
            syntax: DEFAULT_SYNTAX.to_string(),
            sheet_bindings: BTreeSet::new(),
            content: String::new(),
            title: None,
            default_edit_mode: None,
            custom_mapping: None,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&PersistedField> {
        self.fields.get(name)
    }

    /// Fields ordered by their display ordinal.
    #[must_use]
    pub fn ordered_fields(&self) -> Vec<&PersistedField> {
        let mut fields: Vec<&PersistedField> = self.fields.values().collect();
        fields.sort_by_key(|f| f.number);
        fields
    }

    /// Ordinal the next added field receives. Saturates at `u32::MAX`.
    #[must_use]
    pub fn next_field_number(&self) -> u32 {
        self.fields
            .values()
            .map(|f| f.number)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// Inserts (or overwrites) a field, returning the previous one.
    pub fn put_field(&mut self, field: PersistedField) -> Option<PersistedField> {
        self.fields.insert(field.name.clone(), field)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<PersistedField> {
        self.fields.remove(name)
    }

    /// Called by storage after a successful save.
    pub fn mark_saved(&mut self) {
        self.is_new = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_ref() -> DocumentReference {
        DocumentReference::new("xwiki", LocalReference::new("XWiki", "XWikiUsers"))
    }

    #[test]
    fn new_document_defaults() {
        let doc = PersistedDocument::new(users_ref());
        assert!(doc.is_new);
        assert!(!doc.hidden);
        assert!(doc.fields.is_empty());
        assert!(doc.sheet_bindings.is_empty());
        assert_eq!(doc.syntax, DEFAULT_SYNTAX);
        assert_eq!(doc.next_field_number(), 1);
    }

    #[test]
    fn ordered_fields_follow_number_not_name() {
        let mut doc = PersistedDocument::new(users_ref());
        let first = FieldSpec::text("zeta", "Zeta", 10);
        let second = FieldSpec::text("alpha", "Alpha", 10);
        doc.put_field(PersistedField::from_spec(&first, doc.next_field_number()));
        doc.put_field(PersistedField::from_spec(&second, doc.next_field_number()));

        let names: Vec<&str> = doc.ordered_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(doc.next_field_number(), 3);
    }

    #[test]
    fn next_field_number_saturates() {
        let mut doc = PersistedDocument::new(users_ref());
        doc.put_field(PersistedField::from_spec(&FieldSpec::text("last", "Last", 10), u32::MAX));
        assert_eq!(doc.next_field_number(), u32::MAX);
    }

    #[test]
    fn mark_saved_clears_new_flag() {
        let mut doc = PersistedDocument::new(users_ref());
        doc.mark_saved();
        assert!(!doc.is_new);
    }

    #[test]
    fn json_round_trip_preserves_document() {
        let mut doc = PersistedDocument::new(users_ref());
        doc.put_field(PersistedField::from_spec(&FieldSpec::email("email", "e-Mail", 30), 1));
        doc.sheet_bindings.insert(LocalReference::new("XWiki", "XWikiUserSheet"));

        let json = serde_json::to_string(&doc).unwrap();
        let decoded: PersistedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, doc);
    }
}
