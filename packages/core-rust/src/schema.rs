//! Schema declarations: what a mandatory class document must contain.
//!
//! A [`SchemaTarget`] is built once from static declarations through
//! [`SchemaTargetBuilder`], which rejects inconsistent declarations with a
//! [`SchemaError`]. Targets are immutable afterwards and can be shared freely.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field::{
    BooleanDefault, BooleanParams, DbListParams, FieldKind, NumberParams, NumberType,
    SelectorParams, SizeParams, StaticListParams, TextAreaParams, TextParams,
    DEFAULT_LIST_SEPARATOR,
};
use crate::types::LocalReference;

/// Field names end up as element names in the exported XML.
static FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("field name pattern is valid")
});

/// One expected field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Unique key within the schema.
    pub name: String,
    /// Display name. Written on creation, never compared.
    pub pretty_label: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, pretty_label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            pretty_label: pretty_label.into(),
            kind,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, label: impl Into<String>, size: u32) -> Self {
        Self::new(name, label, FieldKind::Text(TextParams { size, default: None }))
    }

    #[must_use]
    pub fn text_area(name: impl Into<String>, label: impl Into<String>, cols: u32, rows: u32) -> Self {
        Self::new(
            name,
            label,
            FieldKind::TextArea(TextAreaParams {
                size: cols,
                rows,
                default: None,
            }),
        )
    }

    /// Template field: an 80x15 text area holding template code.
    #[must_use]
    pub fn template(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Template(TextAreaParams {
                size: 80,
                rows: 15,
                default: None,
            }),
        )
    }

    #[must_use]
    pub fn boolean(
        name: impl Into<String>,
        label: impl Into<String>,
        display_type: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Boolean(BooleanParams {
                display_type: display_type.into(),
                default: BooleanDefault::Unset,
            }),
        )
    }

    #[must_use]
    pub fn number(
        name: impl Into<String>,
        label: impl Into<String>,
        size: u32,
        number_type: NumberType,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Number(NumberParams {
                size,
                number_type,
                default: None,
            }),
        )
    }

    #[must_use]
    pub fn password(name: impl Into<String>, label: impl Into<String>, size: u32) -> Self {
        Self::new(name, label, FieldKind::Password(SizeParams { size }))
    }

    #[must_use]
    pub fn email(name: impl Into<String>, label: impl Into<String>, size: u32) -> Self {
        Self::new(name, label, FieldKind::Email(SizeParams { size }))
    }

    #[must_use]
    pub fn timezone(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Timezone(SizeParams { size: 30 }))
    }

    #[must_use]
    pub fn page(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Page(SelectorParams {
                size: 30,
                multi_select: false,
            }),
        )
    }

    #[must_use]
    pub fn users(name: impl Into<String>, label: impl Into<String>, multi_select: bool) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Users(SelectorParams {
                size: 5,
                multi_select,
            }),
        )
    }

    #[must_use]
    pub fn groups(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Groups(SelectorParams {
                size: 5,
                multi_select: true,
            }),
        )
    }

    #[must_use]
    pub fn levels(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Levels(SelectorParams {
                size: 3,
                multi_select: true,
            }),
        )
    }

    /// Single-select static list; `values` is `|`-separated, e.g. `"---|Text|Wysiwyg"`.
    #[must_use]
    pub fn static_list(name: impl Into<String>, label: impl Into<String>, values: &str) -> Self {
        Self::new(
            name,
            label,
            FieldKind::StaticList(StaticListParams {
                size: 1,
                multi_select: false,
                relational_storage: false,
                values: split_values(values),
                separators: DEFAULT_LIST_SEPARATOR.to_string(),
                display_type: "select".to_string(),
                default: None,
            }),
        )
    }

    /// Database list; relational storage follows the multi-select flag.
    #[must_use]
    pub fn db_list(
        name: impl Into<String>,
        label: impl Into<String>,
        multi_select: bool,
        sql: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::DbList(DbListParams {
                size: 1,
                multi_select,
                relational_storage: multi_select,
                sql: sql.into(),
            }),
        )
    }

    /// Replaces the boolean default. No effect on other kinds.
    #[must_use]
    pub fn with_boolean_default(mut self, default: bool) -> Self {
        if let FieldKind::Boolean(params) = &mut self.kind {
            params.default = default.into();
        }
        self
    }

    /// Applies `edit` to the static list parameters. No effect on other kinds.
    #[must_use]
    pub fn with_list(mut self, edit: impl FnOnce(&mut StaticListParams)) -> Self {
        if let FieldKind::StaticList(params) = &mut self.kind {
            edit(params);
        }
        self
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if !FIELD_NAME.is_match(&self.name) {
            return Err(SchemaError::InvalidFieldName {
                name: self.name.clone(),
            });
        }
        let malformed = |reason: String| SchemaError::MalformedFieldSpec {
            field: self.name.clone(),
            reason,
        };
        match &self.kind {
            FieldKind::StaticList(list) => {
                if list.separators.is_empty() {
                    return Err(malformed("static list declares no separator".into()));
                }
                if let Some(default) = &list.default {
                    let selected: Vec<&str> = if list.multi_select {
                        default
                            .split(|c| list.separators.contains(c))
                            .filter(|v| !v.is_empty())
                            .collect()
                    } else {
                        vec![default.as_str()]
                    };
                    if let Some(missing) = selected.iter().find(|v| !list.values.iter().any(|p| p == *v)) {
                        return Err(malformed(format!(
                            "default value {missing:?} is not one of the permissible values"
                        )));
                    }
                }
            }
            FieldKind::DbList(list) if list.sql.trim().is_empty() => {
                return Err(malformed("database list has an empty query".into()));
            }
            FieldKind::TextArea(area) | FieldKind::Template(area) if area.rows == 0 => {
                return Err(malformed("text area declares zero rows".into()));
            }
            _ => {}
        }
        Ok(())
    }
}

fn split_values(values: &str) -> Vec<String> {
    values
        .split(DEFAULT_LIST_SEPARATOR)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validated description of a mandatory class document.
///
/// Deserialization goes through [`SchemaTargetBuilder::build`], so a decoded
/// target satisfies the same invariants as a declared one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchemaTarget")]
pub struct SchemaTarget {
    pub(crate) class_name: String,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) removed_fields: Vec<String>,
    pub(crate) required_syntax: Option<String>,
    pub(crate) required_hidden: Option<bool>,
    pub(crate) required_sheet: Option<LocalReference>,
    pub(crate) obsolete_sheets: Vec<LocalReference>,
    pub(crate) main_wiki_only: bool,
    pub(crate) custom_mapping: Option<String>,
    pub(crate) default_content: Option<String>,
    pub(crate) default_title: Option<String>,
    pub(crate) default_edit_mode: Option<String>,
}

/// Unvalidated wire form of a [`SchemaTarget`].
#[derive(Deserialize)]
struct RawSchemaTarget {
    class_name: String,
    #[serde(default)]
    fields: Vec<FieldSpec>,
    #[serde(default)]
    removed_fields: Vec<String>,
    #[serde(default)]
    required_syntax: Option<String>,
    #[serde(default)]
    required_hidden: Option<bool>,
    #[serde(default)]
    required_sheet: Option<LocalReference>,
    #[serde(default)]
    obsolete_sheets: Vec<LocalReference>,
    #[serde(default)]
    main_wiki_only: bool,
    #[serde(default)]
    custom_mapping: Option<String>,
    #[serde(default)]
    default_content: Option<String>,
    #[serde(default)]
    default_title: Option<String>,
    #[serde(default)]
    default_edit_mode: Option<String>,
}

impl TryFrom<RawSchemaTarget> for SchemaTarget {
    type Error = SchemaError;

    fn try_from(raw: RawSchemaTarget) -> Result<Self, Self::Error> {
        SchemaTargetBuilder {
            target: SchemaTarget {
                class_name: raw.class_name,
                fields: raw.fields,
                removed_fields: raw.removed_fields,
                required_syntax: raw.required_syntax,
                required_hidden: raw.required_hidden,
                required_sheet: raw.required_sheet,
                obsolete_sheets: raw.obsolete_sheets,
                main_wiki_only: raw.main_wiki_only,
                custom_mapping: raw.custom_mapping,
                default_content: raw.default_content,
                default_title: raw.default_title,
                default_edit_mode: raw.default_edit_mode,
            },
        }
        .build()
    }
}

impl SchemaTarget {
    /// Starts a declaration for the class stored in `class_name` (e.g. `XWiki.XWikiUsers`).
    #[must_use]
    pub fn builder(class_name: impl Into<String>) -> SchemaTargetBuilder {
        SchemaTargetBuilder::new(class_name)
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Expected fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names explicitly scheduled for removal.
    #[must_use]
    pub fn removed_fields(&self) -> &[String] {
        &self.removed_fields
    }

    #[must_use]
    pub fn required_syntax(&self) -> Option<&str> {
        self.required_syntax.as_deref()
    }

    #[must_use]
    pub fn required_hidden(&self) -> Option<bool> {
        self.required_hidden
    }

    #[must_use]
    pub fn required_sheet(&self) -> Option<&LocalReference> {
        self.required_sheet.as_ref()
    }

    #[must_use]
    pub fn obsolete_sheets(&self) -> &[LocalReference] {
        &self.obsolete_sheets
    }

    /// Whether the schema only applies to the primary wiki.
    #[must_use]
    pub fn main_wiki_only(&self) -> bool {
        self.main_wiki_only
    }

    #[must_use]
    pub fn custom_mapping(&self) -> Option<&str> {
        self.custom_mapping.as_deref()
    }

    /// Content written into a new document: the declared text, or `"{class_name} Class"`.
    #[must_use]
    pub fn default_content(&self) -> String {
        self.default_content
            .clone()
            .unwrap_or_else(|| format!("{} Class", self.class_name))
    }

    #[must_use]
    pub fn default_title(&self) -> Option<&str> {
        self.default_title.as_deref()
    }

    #[must_use]
    pub fn default_edit_mode(&self) -> Option<&str> {
        self.default_edit_mode.as_deref()
    }
}

/// Collects declarations for a [`SchemaTarget`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct SchemaTargetBuilder {
    target: SchemaTarget,
}

impl SchemaTargetBuilder {
    fn new(class_name: impl Into<String>) -> Self {
        Self {
            target: SchemaTarget {
                class_name: class_name.into(),
                fields: Vec::new(),
                removed_fields: Vec::new(),
                required_syntax: None,
                required_hidden: None,
                required_sheet: None,
                obsolete_sheets: Vec::new(),
                main_wiki_only: false,
                custom_mapping: None,
                default_content: None,
                default_title: None,
                default_edit_mode: None,
            },
        }
    }

    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.target.fields.push(spec);
        self
    }

    /// Appends a group of fields, typically produced by a per-concern function.
    #[must_use]
    pub fn fields(mut self, specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.target.fields.extend(specs);
        self
    }

    /// Schedules an existing field for removal.
    #[must_use]
    pub fn remove_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.target.removed_fields.contains(&name) {
            self.target.removed_fields.push(name);
        }
        self
    }

    /// Declares `spec` and removes `old_name`. Values are not carried over.
    #[must_use]
    pub fn rename_field(self, old_name: impl Into<String>, spec: FieldSpec) -> Self {
        self.field(spec).remove_field(old_name)
    }

    #[must_use]
    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.target.required_syntax = Some(syntax.into());
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.target.required_hidden = Some(hidden);
        self
    }

    #[must_use]
    pub fn sheet(mut self, sheet: LocalReference) -> Self {
        self.target.required_sheet = Some(sheet);
        self
    }

    /// Marks a sheet as superseded; it is unbound when no other binding remains.
    #[must_use]
    pub fn obsolete_sheet(mut self, sheet: LocalReference) -> Self {
        if !self.target.obsolete_sheets.contains(&sheet) {
            self.target.obsolete_sheets.push(sheet);
        }
        self
    }

    #[must_use]
    pub fn main_wiki_only(mut self) -> Self {
        self.target.main_wiki_only = true;
        self
    }

    #[must_use]
    pub fn custom_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.target.custom_mapping = Some(mapping.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.target.default_content = Some(content.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.target.default_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn edit_mode(mut self, mode: impl Into<String>) -> Self {
        self.target.default_edit_mode = Some(mode.into());
        self
    }

    /// Validates the declarations and returns the finished target.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] on duplicate or invalid field names, on
    /// internally inconsistent field parameters, on a field that is both
    /// declared and removed, and on a required sheet that is also obsolete.
    pub fn build(self) -> Result<SchemaTarget, SchemaError> {
        let target = self.target;
        let mut seen = HashSet::new();
        for spec in &target.fields {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    class: target.class_name.clone(),
                    field: spec.name.clone(),
                });
            }
        }
        if let Some(name) = target.removed_fields.iter().find(|n| seen.contains(n.as_str())) {
            return Err(SchemaError::MalformedFieldSpec {
                field: name.clone(),
                reason: "field is both declared and scheduled for removal".into(),
            });
        }
        if let Some(sheet) = &target.required_sheet {
            if target.obsolete_sheets.contains(sheet) {
                return Err(SchemaError::SheetConflict {
                    sheet: sheet.to_string(),
                });
            }
        }
        Ok(target)
    }
}
