//! Parent-driven value derivation.
//!
//! A derived field recomputes from the values of its parent fields. The
//! computation is picked from the field's free-text selector by substring
//! match, in priority order: age (needs a usable date-of-birth value),
//! then sum, then concatenation. Anything unrecognized computes to an
//! empty value, and a failing computation degrades to empty instead of
//! erroring; derivation never blocks the form.

use chrono::{Datelike, Local, NaiveDate};
use indexmap::IndexMap;

use formwright_common::FieldValue;

/// Key under which the date-of-birth value is exposed to the age
/// computation. Callers bind it to the first parent's value so age works
/// regardless of how that parent is labelled.
pub const DOB_KEY: &str = "dob";

/// Parent values keyed by normalized label, in parent declaration order.
///
/// Order is what concatenation joins in; keys are unique, with a
/// replaced key keeping its original position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParentValues {
    entries: IndexMap<String, FieldValue>,
}

impl ParentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn has_dob(&self) -> bool {
        self.get(DOB_KEY).is_some_and(|v| !v.is_absent())
    }
}

/// Normalization applied to parent labels before keying: lowercased with
/// all whitespace removed, so "Date of Birth" keys as "dateofbirth".
pub fn normalized_label(label: &str) -> String {
    label.to_lowercase().split_whitespace().collect()
}

/// The computation selected from a derived field's logic text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivedLogic {
    /// Whole years between a date-of-birth parent and today.
    Age,
    /// Numeric sum over all parent values.
    Sum,
    /// Parent display texts joined with single spaces.
    Concat,
    /// Nothing recognized; computes to empty.
    Unknown,
}

impl DerivedLogic {
    /// Pick the computation for a selector, first match wins.
    ///
    /// Age is only selected while a usable date-of-birth value is on
    /// hand; a selector containing "age" otherwise falls through to the
    /// later keywords.
    pub fn resolve(logic: &str, parents: &ParentValues) -> Self {
        if logic.contains("age") && parents.has_dob() {
            DerivedLogic::Age
        } else if logic.contains("sum") {
            DerivedLogic::Sum
        } else if logic.contains("concat") {
            DerivedLogic::Concat
        } else {
            DerivedLogic::Unknown
        }
    }
}

/// Compute a derived value from its parents, with age measured against
/// today's date.
pub fn compute(logic: &str, parents: &ParentValues) -> FieldValue {
    compute_at(logic, parents, Local::now().date_naive())
}

/// Compute with an explicit "today", keeping age results deterministic.
pub fn compute_at(logic: &str, parents: &ParentValues, today: NaiveDate) -> FieldValue {
    match DerivedLogic::resolve(logic, parents) {
        DerivedLogic::Age => age_value(parents, today),
        DerivedLogic::Sum => {
            let total: f64 = parents.values().map(FieldValue::as_number).sum();
            FieldValue::Number(total)
        }
        DerivedLogic::Concat => {
            let joined = parents
                .values()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            FieldValue::Text(joined)
        }
        DerivedLogic::Unknown => FieldValue::Empty,
    }
}

fn age_value(parents: &ParentValues, today: NaiveDate) -> FieldValue {
    match parents.get(DOB_KEY).and_then(FieldValue::as_date) {
        Some(dob) => FieldValue::Number(f64::from(age_in_years(dob, today))),
        None => {
            tracing::debug!("unparsable date of birth, age degrades to empty");
            FieldValue::Empty
        }
    }
}

/// Calendar age: year difference, minus one before the birthday.
fn age_in_years(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parents(entries: &[(&str, FieldValue)]) -> ParentValues {
        let mut map = ParentValues::new();
        for (key, value) in entries {
            map.insert(*key, value.clone());
        }
        map
    }

    #[test]
    fn age_counts_whole_years_around_the_birthday() {
        let map = parents(&[("dob", FieldValue::Text("2000-06-15".into()))]);
        assert_eq!(compute_at("age", &map, date(2024, 6, 14)), FieldValue::Number(23.0));
        assert_eq!(compute_at("age", &map, date(2024, 6, 15)), FieldValue::Number(24.0));
        assert_eq!(compute_at("age", &map, date(2024, 12, 31)), FieldValue::Number(24.0));
    }

    #[test]
    fn age_accepts_a_date_value_directly() {
        let map = parents(&[("dob", FieldValue::Date(date(2000, 6, 15)))]);
        assert_eq!(compute_at("age", &map, date(2025, 1, 1)), FieldValue::Number(24.0));
    }

    #[test]
    fn age_needs_a_usable_dob_value() {
        // no dob key at all: the selector falls through the chain and
        // lands on nothing
        let map = parents(&[("birthdate", FieldValue::Text("2000-06-15".into()))]);
        assert_eq!(compute_at("age", &map, date(2024, 6, 15)), FieldValue::Empty);

        // without a dob a selector can still reach a later keyword
        let map = parents(&[("a", FieldValue::Text("3".into()))]);
        assert_eq!(
            compute_at("average", &map, date(2024, 6, 15)),
            FieldValue::Empty
        );
        assert_eq!(
            compute_at("age sum", &map, date(2024, 6, 15)),
            FieldValue::Number(3.0)
        );

        // an unparsable dob selects age but degrades to empty
        let map = parents(&[("dob", FieldValue::Text("not a date".into()))]);
        assert_eq!(compute_at("age", &map, date(2024, 6, 15)), FieldValue::Empty);
    }

    #[test]
    fn sum_coerces_each_value_numerically() {
        let map = parents(&[
            ("a", FieldValue::Text("3".into())),
            ("b", FieldValue::Text("4.5".into())),
            ("c", FieldValue::Text("x".into())),
        ]);
        assert_eq!(compute_at("sum", &map, date(2024, 1, 1)), FieldValue::Number(7.5));

        // "NaN" parses as a float but still counts as zero
        let map = parents(&[
            ("a", FieldValue::Text("3".into())),
            ("b", FieldValue::Text("NaN".into())),
        ]);
        assert_eq!(compute_at("sum", &map, date(2024, 1, 1)), FieldValue::Number(3.0));

        let map = parents(&[("only", FieldValue::Number(2.5))]);
        assert_eq!(compute_at("sum", &map, date(2024, 1, 1)), FieldValue::Number(2.5));
    }

    #[test]
    fn concat_joins_display_text_in_insertion_order() {
        let map = parents(&[
            ("first", FieldValue::Text("Hello".into())),
            ("last", FieldValue::Text("World".into())),
        ]);
        assert_eq!(
            compute_at("concat", &map, date(2024, 1, 1)),
            FieldValue::Text("Hello World".into())
        );

        let map = parents(&[
            ("n", FieldValue::Number(7.0)),
            ("b", FieldValue::Bool(true)),
            ("gap", FieldValue::Empty),
        ]);
        assert_eq!(
            compute_at("concat", &map, date(2024, 1, 1)),
            FieldValue::Text("7 true ".into())
        );
    }

    #[test]
    fn unrecognized_selector_yields_empty() {
        let map = parents(&[("a", FieldValue::Text("3".into()))]);
        assert_eq!(compute_at("multiply", &map, date(2024, 1, 1)), FieldValue::Empty);
        assert_eq!(compute_at("", &map, date(2024, 1, 1)), FieldValue::Empty);
    }

    #[test]
    fn selector_priority_is_age_then_sum_then_concat() {
        let map = parents(&[("dob", FieldValue::Text("2000-01-01".into()))]);
        assert_eq!(
            compute_at("age sum concat", &map, date(2024, 1, 1)),
            FieldValue::Number(24.0)
        );

        let map = parents(&[("a", FieldValue::Text("1".into()))]);
        assert_eq!(
            compute_at("sum concat", &map, date(2024, 1, 1)),
            FieldValue::Number(1.0)
        );
    }

    #[test]
    fn replacing_a_key_keeps_its_position() {
        let mut map = ParentValues::new();
        map.insert("a", FieldValue::Text("1".into()));
        map.insert("b", FieldValue::Text("2".into()));
        map.insert("a", FieldValue::Text("9".into()));

        assert_eq!(map.len(), 2);
        let collected: Vec<String> = map.values().map(|v| v.to_string()).collect();
        assert_eq!(collected, vec!["9", "2"]);
    }

    #[test]
    fn labels_normalize_lowercase_without_spaces() {
        assert_eq!(normalized_label("Date of Birth"), "dateofbirth");
        assert_eq!(normalized_label("  First\tName "), "firstname");
        assert_eq!(normalized_label("Total"), "total");
    }
}
