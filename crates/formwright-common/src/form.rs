//! Saved form snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::field::FormField;

/// Opaque saved-form identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormId(String);

impl FormId {
    pub fn new() -> Self {
        Self(format!("form_{}", Uuid::new_v4()))
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, timestamped snapshot of a field collection.
///
/// Snapshots are frozen at save time: later edits to the working
/// collection never reach back into a saved form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: FormId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub fields: Vec<FormField>,
}

impl Form {
    /// Snapshot `fields` under `name` with a fresh identity and the
    /// current time.
    pub fn snapshot(name: impl Into<String>, fields: &[FormField]) -> Self {
        Self {
            id: FormId::new(),
            name: name.into(),
            created_at: Utc::now(),
            fields: fields.to_vec(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
