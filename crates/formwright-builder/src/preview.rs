//! Live form preview.
//!
//! A `PreviewSession` takes a snapshot of the working field collection
//! and plays through the fill-out lifecycle: defaults are seeded once,
//! derived fields recompute after every edit, and submission validates
//! every directly-entered field at once. Derived fields whose parent
//! chain loops are frozen at empty and reported as [`PreviewIssue`]s
//! instead of spinning the recomputation forever.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use formwright_common::{FieldId, FieldValue, FormField};
use formwright_engine::derive::{self, ParentValues};
use formwright_engine::FieldValidator;

/// A derived-field configuration problem found when the session was
/// built.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PreviewIssue {
    #[error("Derived field {field} cannot compute: its parent chain contains a cycle")]
    ParentCycle { field: FieldId },
}

impl PreviewIssue {
    pub fn field_id(&self) -> &FieldId {
        match self {
            PreviewIssue::ParentCycle { field } => field,
        }
    }
}

/// The outcome of submitting the previewed form.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    /// Every field passed; the payload is the full value map, derived
    /// entries included.
    Accepted { values: HashMap<FieldId, FieldValue> },
    /// At least one field failed; nothing is submitted and every
    /// failure is reported at once.
    Rejected { errors: HashMap<FieldId, Vec<String>> },
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted { .. })
    }
}

pub struct PreviewSession {
    fields: Vec<FormField>,
    validator: FieldValidator,
    values: HashMap<FieldId, FieldValue>,
    errors: HashMap<FieldId, Vec<String>>,
    cyclic: HashSet<FieldId>,
    issues: Vec<PreviewIssue>,
}

impl PreviewSession {
    /// Snapshot `fields` and seed the value map: defaults for
    /// directly-entered fields, computed values for derived ones.
    pub fn new(fields: &[FormField]) -> Self {
        let mut fields: Vec<FormField> = fields.to_vec();
        fields.sort_by_key(|f| f.order);

        let cyclic = cyclic_parents(&fields);
        let issues: Vec<PreviewIssue> = fields
            .iter()
            .filter(|f| cyclic.contains(&f.id))
            .map(|f| PreviewIssue::ParentCycle {
                field: f.id.clone(),
            })
            .collect();
        for issue in &issues {
            tracing::warn!(%issue, "derived field disabled for this session");
        }

        let mut session = Self {
            fields,
            validator: FieldValidator::new(),
            values: HashMap::new(),
            errors: HashMap::new(),
            cyclic,
            issues,
        };
        session.seed_defaults();
        session.recompute_derived();
        session
    }

    fn seed_defaults(&mut self) {
        for field in &self.fields {
            if field.is_derived {
                continue;
            }
            self.values.insert(field.id.clone(), field.seed_value());
        }
    }

    /// Recompute every derived field until the value map stops changing.
    ///
    /// Each sweep reads the pre-sweep map, so chained derivations settle
    /// one link per sweep; with cyclic fields excluded, one sweep per
    /// derived field is always enough.
    fn recompute_derived(&mut self) {
        let passes = self.fields.iter().filter(|f| f.is_derived).count() + 1;
        for _ in 0..passes {
            let snapshot = self.values.clone();
            let mut changed = false;
            for field in &self.fields {
                if !field.is_derived || self.cyclic.contains(&field.id) {
                    continue;
                }
                let Some(logic) = field.derived_logic.as_deref() else {
                    continue;
                };
                if logic.trim().is_empty() || field.parent_fields.is_empty() {
                    continue;
                }
                let parents = gather_parents(&self.fields, field, &snapshot);
                let computed = derive::compute(logic, &parents);
                if self.values.get(&field.id) != Some(&computed) {
                    self.values.insert(field.id.clone(), computed);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Record a user edit to a directly-entered field, clear its errors
    /// and recompute derived values. Edits to unknown or derived fields
    /// are ignored.
    pub fn set_value(&mut self, id: &FieldId, value: FieldValue) {
        let Some(field) = self.fields.iter().find(|f| f.id == *id) else {
            tracing::debug!(field_id = %id, "edit to unknown field ignored");
            return;
        };
        if field.is_derived {
            tracing::debug!(field_id = %id, "edit to derived field ignored");
            return;
        }
        self.values.insert(id.clone(), value);
        self.errors.remove(id);
        self.recompute_derived();
    }

    /// Validate every directly-entered field and either accept with the
    /// full value map or reject with every failure at once.
    ///
    /// A field's rule failures come first, then a synthesized
    /// "<label> is required" when the field is required and its value is
    /// absent.
    pub fn submit(&mut self) -> Submission {
        let mut rejections: HashMap<FieldId, Vec<String>> = HashMap::new();
        for field in &self.fields {
            if field.is_derived {
                continue;
            }
            let value = self.values.get(&field.id).cloned().unwrap_or_default();
            let mut messages = self.validator.check(&value, &field.validation);
            if field.required && value.is_absent() {
                messages.push(format!("{} is required", field.label));
            }
            if !messages.is_empty() {
                rejections.insert(field.id.clone(), messages);
            }
        }
        self.errors = rejections.clone();
        if rejections.is_empty() {
            Submission::Accepted {
                values: self.values.clone(),
            }
        } else {
            Submission::Rejected { errors: rejections }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The previewed fields, in display order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn value(&self, id: &FieldId) -> Option<&FieldValue> {
        self.values.get(id)
    }

    /// The live value map, derived entries included.
    pub fn values(&self) -> &HashMap<FieldId, FieldValue> {
        &self.values
    }

    /// Current failure messages for one field; empty outside of a
    /// rejected submission.
    pub fn errors(&self, id: &FieldId) -> &[String] {
        self.errors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Configuration problems found at session start, in field order.
    pub fn issues(&self) -> &[PreviewIssue] {
        &self.issues
    }
}

/// Build the parent-value map for one derived field from the given value
/// snapshot.
///
/// Each resolvable parent is keyed by its normalized label, and the
/// first one is additionally keyed as `"dob"`: that alias is how the
/// age computation finds a birth date whatever the parent's label says.
/// Parents pointing at ids missing from the collection are skipped.
fn gather_parents(
    fields: &[FormField],
    field: &FormField,
    values: &HashMap<FieldId, FieldValue>,
) -> ParentValues {
    let mut parents = ParentValues::new();
    let mut dob_bound = false;
    for parent_id in &field.parent_fields {
        let Some(parent) = fields.iter().find(|f| f.id == *parent_id) else {
            continue;
        };
        let value = values.get(parent_id).cloned().unwrap_or_default();
        let label_key = derive::normalized_label(&parent.label);
        if dob_bound {
            parents.insert(label_key, value);
        } else {
            parents.insert(label_key, value.clone());
            parents.insert(derive::DOB_KEY, value);
            dob_bound = true;
        }
    }
    parents
}

/// Ids of derived fields that can never settle because their parent
/// chain loops back on itself (self-references included), found by
/// peeling off fields whose derived parents are all already settled.
/// A field depending on a looping field is unresolvable too and is
/// reported the same way.
fn cyclic_parents(fields: &[FormField]) -> HashSet<FieldId> {
    let derived: HashSet<&FieldId> = fields
        .iter()
        .filter(|f| f.is_derived)
        .map(|f| &f.id)
        .collect();
    let mut unresolved: HashMap<&FieldId, Vec<&FieldId>> = fields
        .iter()
        .filter(|f| f.is_derived)
        .map(|f| {
            let deps: Vec<&FieldId> = f
                .parent_fields
                .iter()
                .filter(|p| derived.contains(p))
                .collect();
            (&f.id, deps)
        })
        .collect();

    loop {
        let ready: Vec<&FieldId> = unresolved
            .iter()
            .filter(|(_, deps)| deps.iter().all(|d| !unresolved.contains_key(d)))
            .map(|(id, _)| *id)
            .collect();
        if ready.is_empty() {
            break;
        }
        for id in ready {
            unresolved.remove(id);
        }
    }

    unresolved.into_keys().cloned().collect()
}
