//! Field definitions.
//!
//! `FormField` is the unit the builder manipulates: a typed input with a
//! label, an optional default, an ordered rule list and, for computed
//! fields, a derivation setup pointing at parent fields. Fields enter the
//! world through [`FieldDraft`] (palette templates realized by the store)
//! and change through [`FieldPatch`] (partial edits from the
//! configuration panel).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::value::FieldValue;

// =============================================================================
// Identity
// =============================================================================

/// Opaque field identifier, assigned once when a field is added and
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId(String);

impl FieldId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(format!("field_{}", Uuid::new_v4()))
    }

    /// Wrap an existing identifier, e.g. one read back from storage.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Field types and validation rules
// =============================================================================

/// The input widget a field renders as. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    /// Human-readable name, used for palette labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Textarea => "Textarea",
            FieldType::Select => "Select",
            FieldType::Radio => "Radio",
            FieldType::Checkbox => "Checkbox",
            FieldType::Date => "Date",
        }
    }

    /// Choice-style fields carry an options list.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

/// Validation rule discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    NotEmpty,
    MinLength,
    MaxLength,
    Email,
    Password,
}

impl RuleKind {
    /// Length rules carry a numeric bound; the rest ignore it.
    pub fn takes_bound(&self) -> bool {
        matches!(self, RuleKind::MinLength | RuleKind::MaxLength)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Rule message cannot be blank")]
    BlankMessage,
}

/// A single validation rule attached to a field.
///
/// `bound` is only meaningful for the length rules and is dropped for
/// every other kind at construction. A length rule without a bound is
/// legal and simply never fails.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<u32>,
    pub message: String,
}

impl ValidationRule {
    /// Build a rule. The message is trimmed and must be non-blank; the
    /// bound is kept only for kinds that take one.
    pub fn new(
        kind: RuleKind,
        bound: Option<u32>,
        message: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let message = message.into().trim().to_string();
        if message.is_empty() {
            return Err(RuleError::BlankMessage);
        }
        Ok(Self {
            kind,
            bound: if kind.takes_bound() { bound } else { None },
            message,
        })
    }
}

// =============================================================================
// Fields
// =============================================================================

/// A single field definition inside a form.
///
/// `default_value` and `validation` are inert while `is_derived` is set;
/// a derived field computes its value from `parent_fields` through the
/// selector in `derived_logic` and takes no direct input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "FieldValue::is_empty")]
    pub default_value: FieldValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_derived: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_fields: Vec<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_logic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub order: u32,
}

impl FormField {
    /// The initial preview value for this field, coerced by field type.
    ///
    /// Checkboxes read their default as a boolean (the literal string
    /// `"true"` or a true bool), date fields parse theirs as an ISO date
    /// and degrade to empty when unparsable, everything else takes the
    /// default as-is, falling back to empty text when there is none.
    /// Derived fields are computed, never seeded.
    pub fn seed_value(&self) -> FieldValue {
        if self.is_derived {
            return FieldValue::Empty;
        }
        match self.field_type {
            FieldType::Checkbox => {
                let checked = match &self.default_value {
                    FieldValue::Bool(b) => *b,
                    FieldValue::Text(s) => s == "true",
                    _ => false,
                };
                FieldValue::Bool(checked)
            }
            FieldType::Date => match self.default_value.as_date() {
                Some(d) => FieldValue::Date(d),
                None => FieldValue::Empty,
            },
            _ => match &self.default_value {
                FieldValue::Empty => FieldValue::Text(String::new()),
                other => other.clone(),
            },
        }
    }

    /// Merge a partial edit into this field. Unset patch members leave
    /// the field untouched.
    pub fn apply(&mut self, patch: FieldPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(default_value) = patch.default_value {
            self.default_value = default_value;
        }
        if let Some(validation) = patch.validation {
            self.validation = validation;
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        match patch.derived {
            Some(DerivedChange::Make { parents, logic }) => {
                // an incomplete setup is dropped, matching the dialog's
                // save gating
                if !parents.is_empty() && !logic.trim().is_empty() {
                    self.is_derived = true;
                    self.parent_fields = parents;
                    self.derived_logic = Some(logic);
                    self.default_value = FieldValue::Empty;
                }
            }
            Some(DerivedChange::Clear) => {
                self.is_derived = false;
                self.parent_fields = Vec::new();
                self.derived_logic = None;
            }
            None => {}
        }
    }
}

/// Everything needed to add a field except its identity and position,
/// which the store assigns on insertion.
#[derive(Clone, Debug)]
pub struct FieldDraft {
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
    pub default_value: FieldValue,
    pub validation: Vec<ValidationRule>,
    pub options: Vec<String>,
}

impl FieldDraft {
    /// The palette template for a field type: a "<Type> Field" label,
    /// not required, no default, and two placeholder options for choice
    /// types.
    pub fn template(field_type: FieldType) -> Self {
        Self {
            field_type,
            label: format!("{} Field", field_type.display_name()),
            required: false,
            default_value: FieldValue::Empty,
            validation: Vec::new(),
            options: if field_type.has_options() {
                vec!["Option 1".to_string(), "Option 2".to_string()]
            } else {
                Vec::new()
            },
        }
    }

    /// Realize the draft as a field with the given identity and position.
    pub fn into_field(self, id: FieldId, order: u32) -> FormField {
        FormField {
            id,
            field_type: self.field_type,
            label: self.label,
            required: self.required,
            default_value: self.default_value,
            validation: self.validation,
            is_derived: false,
            parent_fields: Vec::new(),
            derived_logic: None,
            options: self.options,
            order,
        }
    }
}

/// A partial edit to an existing field.
///
/// Built up with the chaining setters and applied through
/// [`FormField::apply`]. The derived configuration changes as a unit:
/// either [`make_derived`](Self::make_derived) with parents and a
/// selector, or [`clear_derived`](Self::clear_derived) back to a plain
/// input.
#[derive(Clone, Debug, Default)]
pub struct FieldPatch {
    label: Option<String>,
    required: Option<bool>,
    default_value: Option<FieldValue>,
    validation: Option<Vec<ValidationRule>>,
    options: Option<Vec<String>>,
    derived: Option<DerivedChange>,
}

#[derive(Clone, Debug)]
enum DerivedChange {
    Make { parents: Vec<FieldId>, logic: String },
    Clear,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn validation(mut self, rules: Vec<ValidationRule>) -> Self {
        self.validation = Some(rules);
        self
    }

    pub fn options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    /// Turn the field into a derived one computing `logic` over
    /// `parents`, dropping any default value. Applied only when at least
    /// one parent and a non-blank selector are given.
    pub fn make_derived(mut self, parents: Vec<FieldId>, logic: impl Into<String>) -> Self {
        self.derived = Some(DerivedChange::Make {
            parents,
            logic: logic.into(),
        });
        self
    }

    /// Revert a derived field to a plain input.
    pub fn clear_derived(mut self) -> Self {
        self.derived = Some(DerivedChange::Clear);
        self
    }
}

fn is_false(value: &bool) -> bool {
    !value
}
