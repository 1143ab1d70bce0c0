//! Formwright shared model
//!
//! The data model every other Formwright crate builds on: typed field
//! values, field definitions with validation and derivation setup, and
//! saved form snapshots.
//!
//! ## Layout
//! - **value**: the tagged [`FieldValue`] variant and its coercions
//! - **field**: [`FormField`] plus the draft and patch types that
//!   create and edit fields
//! - **form**: immutable, named [`Form`] snapshots

pub mod field;
pub mod form;
pub mod value;

pub use field::{
    FieldDraft, FieldId, FieldPatch, FieldType, FormField, RuleError, RuleKind, ValidationRule,
};
pub use form::{Form, FormId};
pub use value::FieldValue;
