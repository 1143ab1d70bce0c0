//! The form store.
//!
//! One `FormStore` owns everything the builder edits: the working field
//! collection (ordered by each field's `order`), the saved-form library,
//! and the preview-mode flag. Mutations with unmet preconditions are
//! quiet no-ops rather than errors: the calling layer disables those
//! actions, and the store must stay consistent even when it doesn't.

use formwright_common::{FieldDraft, FieldId, FieldPatch, Form, FormField, FormId, ValidationRule};

use crate::preview::PreviewSession;
use crate::storage::{FormStorage, MemoryStorage};

pub struct FormStore {
    fields: Vec<FormField>,
    saved: Vec<Form>,
    preview_mode: bool,
    storage: Box<dyn FormStorage>,
}

impl FormStore {
    /// Open a store over the given storage, reading back any previously
    /// saved forms. Unreadable or malformed storage starts the store
    /// empty instead of failing.
    pub fn open(storage: Box<dyn FormStorage>) -> Self {
        let saved = match storage.load() {
            Ok(forms) => forms,
            Err(e) => {
                tracing::warn!(error = %e, "could not load saved forms, starting empty");
                Vec::new()
            }
        };
        Self {
            fields: Vec::new(),
            saved,
            preview_mode: false,
            storage,
        }
    }

    /// A store over throwaway in-memory storage.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStorage::new()))
    }

    // =========================================================================
    // Working collection
    // =========================================================================

    /// Add a field to the end of the working collection, minting its
    /// identity and position. Never fails.
    pub fn add_field(&mut self, draft: FieldDraft) -> FieldId {
        let id = FieldId::new();
        let order = self.fields.len() as u32;
        self.fields.push(draft.into_field(id.clone(), order));
        tracing::debug!(field_id = %id, order, "field added");
        id
    }

    /// Merge a partial edit into the matching field; ignored when `id`
    /// is unknown.
    pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) {
        match self.fields.iter_mut().find(|f| f.id == *id) {
            Some(field) => field.apply(patch),
            None => tracing::debug!(field_id = %id, "update for unknown field ignored"),
        }
    }

    /// Append a validation rule to the matching field; ignored when `id`
    /// is unknown.
    pub fn add_rule(&mut self, id: &FieldId, rule: ValidationRule) {
        match self.fields.iter_mut().find(|f| f.id == *id) {
            Some(field) => field.validation.push(rule),
            None => tracing::debug!(field_id = %id, "rule for unknown field ignored"),
        }
    }

    /// Remove the rule at `index` from the matching field; ignored when
    /// `id` is unknown or `index` is out of range.
    pub fn remove_rule(&mut self, id: &FieldId, index: usize) {
        let Some(field) = self.fields.iter_mut().find(|f| f.id == *id) else {
            tracing::debug!(field_id = %id, "rule removal for unknown field ignored");
            return;
        };
        if index >= field.validation.len() {
            tracing::debug!(field_id = %id, index, "out-of-range rule removal ignored");
            return;
        }
        field.validation.remove(index);
    }

    /// Remove the matching field and renumber the remainder; ignored
    /// when `id` is unknown.
    pub fn delete_field(&mut self, id: &FieldId) {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != *id);
        if self.fields.len() != before {
            self.renumber();
        }
    }

    /// Move the field at position `from` to position `to`, renumbering
    /// everything. Out-of-range positions are ignored.
    pub fn reorder_fields(&mut self, from: usize, to: usize) {
        if from >= self.fields.len() || to >= self.fields.len() {
            tracing::debug!(from, to, "out-of-range reorder ignored");
            return;
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        self.renumber();
    }

    /// Drop the working collection entirely.
    pub fn clear_current_form(&mut self) {
        self.fields.clear();
    }

    fn renumber(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.order = index as u32;
        }
    }

    // =========================================================================
    // Saved forms
    // =========================================================================

    /// Snapshot the working collection under `name` and persist the
    /// saved-form list. Returns the new form's id, or `None` (and does
    /// nothing) when the trimmed name or the collection is empty.
    pub fn save_form(&mut self, name: &str) -> Option<FormId> {
        let name = name.trim();
        if name.is_empty() || self.fields.is_empty() {
            tracing::debug!("save with empty name or no fields ignored");
            return None;
        }
        let form = Form::snapshot(name, &self.fields);
        let id = form.id.clone();
        self.saved.push(form);
        self.persist();
        tracing::info!(form_id = %id, name, "form saved");
        Some(id)
    }

    /// Replace the working collection with a copy of the matching saved
    /// form's fields; ignored when `id` is unknown.
    pub fn load_form(&mut self, id: &FormId) {
        let Some(form) = self.saved.iter().find(|f| f.id == *id) else {
            tracing::debug!(form_id = %id, "load of unknown form ignored");
            return;
        };
        let mut fields = form.fields.clone();
        // stored data decides ordering by `order`, not array position
        fields.sort_by_key(|f| f.order);
        self.fields = fields;
    }

    /// Remove the matching saved form and persist; ignored when `id` is
    /// unknown.
    pub fn delete_form(&mut self, id: &FormId) {
        let before = self.saved.len();
        self.saved.retain(|f| f.id != *id);
        if self.saved.len() != before {
            self.persist();
            tracing::info!(form_id = %id, "form deleted");
        }
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.saved) {
            // state stands either way; the next successful save writes it
            tracing::warn!(error = %e, "failed to persist saved forms");
        }
    }

    // =========================================================================
    // Preview
    // =========================================================================

    pub fn set_preview_mode(&mut self, on: bool) {
        self.preview_mode = on;
    }

    pub fn preview_mode(&self) -> bool {
        self.preview_mode
    }

    /// Start a preview session over a snapshot of the working
    /// collection.
    pub fn preview(&self) -> PreviewSession {
        PreviewSession::new(&self.fields)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The working collection, in field order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, id: &FieldId) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == *id)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Saved forms in save order.
    pub fn saved_forms(&self) -> &[Form] {
        &self.saved
    }

    pub fn saved_form(&self, id: &FormId) -> Option<&Form> {
        self.saved.iter().find(|f| f.id == *id)
    }
}
