//! Field kinds and their kind-specific parameters.
//!
//! [`FieldKind`] is a closed sum type: every schema field and every persisted
//! field carries exactly one variant, and the variant's payload holds the
//! parameters the reconciler compares. Adding a kind means adding a variant,
//! which the exhaustive matches in [`crate::reconcile`] then force to be handled.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used to join static list values when none is declared.
pub const DEFAULT_LIST_SEPARATOR: &str = "|";

/// Tri-state default of a boolean field.
///
/// Persisted as the integers `-1` (unset), `0` (false) and `1` (true).
/// `Unset` and `False` are distinct states and never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum BooleanDefault {
    /// No default declared.
    #[default]
    Unset,
    False,
    True,
}

impl BooleanDefault {
    /// Integer encoding used for persistence and comparison.
    #[must_use]
    pub fn encode(self) -> i8 {
        match self {
            Self::Unset => -1,
            Self::False => 0,
            Self::True => 1,
        }
    }

    /// Decodes the persisted integer. Anything other than `-1`, `0`, `1` is rejected.
    ///
    /// # Errors
    ///
    /// Returns the rejected value when it is outside the tri-state range.
    pub fn decode(value: i8) -> Result<Self, i8> {
        match value {
            -1 => Ok(Self::Unset),
            0 => Ok(Self::False),
            1 => Ok(Self::True),
            other => Err(other),
        }
    }
}

impl From<bool> for BooleanDefault {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl From<BooleanDefault> for i8 {
    fn from(value: BooleanDefault) -> Self {
        value.encode()
    }
}

impl TryFrom<i8> for BooleanDefault {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::decode(value).map_err(|v| format!("boolean default out of range: {v}"))
    }
}

/// Storage type of a number field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberType {
    #[default]
    Integer,
    Long,
    Float,
    Double,
}

/// Parameters shared by single-line fields that only carry a display size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeParams {
    pub size: u32,
}

/// Single-line text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextParams {
    pub size: u32,
    pub default: Option<String>,
}

/// Multi-line text field; `size` is the column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAreaParams {
    pub size: u32,
    pub rows: u32,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanParams {
    /// Display flavour (`yesno`, `checkbox`, `active`, `allow`, ...).
    pub display_type: String,
    pub default: BooleanDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberParams {
    pub size: u32,
    pub number_type: NumberType,
    pub default: Option<i64>,
}

/// List whose permissible values are declared inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticListParams {
    pub size: u32,
    pub multi_select: bool,
    /// Whether selected values are stored one row per value.
    pub relational_storage: bool,
    pub values: Vec<String>,
    /// Characters accepted as value separators; the first one is used when joining.
    pub separators: String,
    pub display_type: String,
    pub default: Option<String>,
}

impl StaticListParams {
    /// Separator used to join selected values.
    #[must_use]
    pub fn separator(&self) -> &str {
        self.separators
            .chars()
            .next()
            .map_or(DEFAULT_LIST_SEPARATOR, |c| &self.separators[..c.len_utf8()])
    }
}

/// List whose permissible values come from a database query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbListParams {
    pub size: u32,
    pub multi_select: bool,
    pub relational_storage: bool,
    pub sql: String,
}

/// Picker over pages, users, groups or right levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorParams {
    pub size: u32,
    pub multi_select: bool,
}

/// Kind of a schema field together with its kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text(TextParams),
    TextArea(TextAreaParams),
    Boolean(BooleanParams),
    Number(NumberParams),
    Password(SizeParams),
    StaticList(StaticListParams),
    DbList(DbListParams),
    Page(SelectorParams),
    Users(SelectorParams),
    Groups(SelectorParams),
    Levels(SelectorParams),
    Template(TextAreaParams),
    Timezone(SizeParams),
    Email(SizeParams),
}

impl FieldKind {
    /// Parameter-free discriminant of this kind.
    #[must_use]
    pub fn tag(&self) -> FieldKindTag {
        match self {
            Self::Text(_) => FieldKindTag::Text,
            Self::TextArea(_) => FieldKindTag::TextArea,
            Self::Boolean(_) => FieldKindTag::Boolean,
            Self::Number(_) => FieldKindTag::Number,
            Self::Password(_) => FieldKindTag::Password,
            Self::StaticList(_) => FieldKindTag::StaticList,
            Self::DbList(_) => FieldKindTag::DbList,
            Self::Page(_) => FieldKindTag::Page,
            Self::Users(_) => FieldKindTag::Users,
            Self::Groups(_) => FieldKindTag::Groups,
            Self::Levels(_) => FieldKindTag::Levels,
            Self::Template(_) => FieldKindTag::Template,
            Self::Timezone(_) => FieldKindTag::Timezone,
            Self::Email(_) => FieldKindTag::Email,
        }
    }
}

/// Discriminant of [`FieldKind`], used to detect kind changes and in change reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKindTag {
    Text,
    TextArea,
    Boolean,
    Number,
    Password,
    StaticList,
    DbList,
    Page,
    Users,
    Groups,
    Levels,
    Template,
    Timezone,
    Email,
}

impl fmt::Display for FieldKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::TextArea => "textarea",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Password => "password",
            Self::StaticList => "static_list",
            Self::DbList => "db_list",
            Self::Page => "page",
            Self::Users => "users",
            Self::Groups => "groups",
            Self::Levels => "levels",
            Self::Template => "template",
            Self::Timezone => "timezone",
            Self::Email => "email",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_default_encoding() {
        assert_eq!(BooleanDefault::Unset.encode(), -1);
        assert_eq!(BooleanDefault::False.encode(), 0);
        assert_eq!(BooleanDefault::True.encode(), 1);
        assert_eq!(BooleanDefault::default(), BooleanDefault::Unset);
    }

    #[test]
    fn boolean_default_unset_is_not_false() {
        assert_ne!(BooleanDefault::Unset, BooleanDefault::False);
        assert_ne!(
            BooleanDefault::Unset.encode(),
            BooleanDefault::from(false).encode()
        );
    }

    #[test]
    fn boolean_default_decode_rejects_out_of_range() {
        assert_eq!(BooleanDefault::decode(1), Ok(BooleanDefault::True));
        assert_eq!(BooleanDefault::decode(2), Err(2));
        assert!(serde_json::from_str::<BooleanDefault>("7").is_err());
    }

    #[test]
    fn boolean_default_persists_as_integer() {
        let json = serde_json::to_string(&BooleanDefault::Unset).unwrap();
        assert_eq!(json, "-1");
    }

    #[test]
    fn static_list_separator_uses_first_char() {
        let params = StaticListParams {
            size: 1,
            multi_select: false,
            relational_storage: false,
            values: vec!["a".into(), "b".into()],
            separators: " ,|".into(),
            display_type: "select".into(),
            default: None,
        };
        assert_eq!(params.separator(), " ");

        let empty = StaticListParams {
            separators: String::new(),
            ..params
        };
        assert_eq!(empty.separator(), DEFAULT_LIST_SEPARATOR);
    }

    #[test]
    fn field_kind_tag_matches_variant() {
        let kind = FieldKind::Timezone(SizeParams { size: 30 });
        assert_eq!(kind.tag(), FieldKindTag::Timezone);
        assert_eq!(kind.tag().to_string(), "timezone");
    }

    #[test]
    fn field_kind_serializes_with_kind_tag() {
        let kind = FieldKind::Email(SizeParams { size: 30 });
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "email");
        assert_eq!(json["size"], 30);
    }
}
