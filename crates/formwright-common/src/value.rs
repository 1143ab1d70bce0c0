//! Typed field values.
//!
//! Everything a field can hold (entered text, a number, a checkbox
//! state, a picked date, or nothing) is one `FieldValue` variant.
//! The coercion methods here give each consumer an explicit conversion
//! instead of implicit stringly-typed juggling: validation reads text,
//! derivation reads numbers and dates, rendering reads display text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value as entered, defaulted or computed.
///
/// On the wire this is a tagged variant (`"empty"`, `{"text": ...}`,
/// `{"number": ...}`, `{"bool": ...}`, `{"date": "YYYY-MM-DD"}`) so that
/// persisted values round-trip without guessing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValue {
    /// No value at all. Displays as the empty string.
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    /// True only for the `Empty` variant.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Absence in the loose sense: `Empty`, the empty string, zero and
    /// `false` all count as absent. Dates are always present.
    pub fn is_absent(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(n) => *n == 0.0 || n.is_nan(),
            FieldValue::Bool(b) => !b,
            FieldValue::Date(_) => false,
        }
    }

    /// The inner text, when this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric coercion: numbers pass through, text is trimmed and
    /// parsed as a float, anything unparsable or non-numeric counts
    /// as zero. Text that parses to NaN counts as zero as well.
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if !n.is_nan() => n,
                _ => 0.0,
            },
            _ => 0.0,
        }
    }

    /// Calendar coercion: dates pass through, text is parsed as an ISO
    /// `YYYY-MM-DD` date, everything else is `None`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}
