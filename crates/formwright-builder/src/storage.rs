//! Durable storage for saved forms.
//!
//! The store persists its whole saved-form list through [`FormStorage`]
//! on every save or delete, and reads it back once on startup. The
//! shipped backends are a JSON file under the user's home directory and
//! an in-memory stand-in for tests.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;

use formwright_common::Form;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read saved forms: {0}")]
    Read(String),

    #[error("Failed to parse saved forms: {0}")]
    Parse(String),

    #[error("Failed to serialize saved forms: {0}")]
    Serialize(String),

    #[error("Failed to write saved forms: {0}")]
    Write(String),

    #[error("Cannot locate home directory")]
    NoHomeDir,
}

/// Where the saved-form list lives between sessions.
///
/// Both operations are synchronous; the single-threaded store calls them
/// inline from the mutation that changed the list.
pub trait FormStorage {
    /// Read the persisted list. A missing backing store is an empty
    /// list, not an error.
    fn load(&self) -> Result<Vec<Form>, StorageError>;

    /// Replace the persisted list with `forms`.
    fn save(&self, forms: &[Form]) -> Result<(), StorageError>;
}

/// Saved forms as a pretty-printed JSON array in a single file.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional location: `~/.formwright/forms.json`.
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let home = dirs::home_dir().ok_or(StorageError::NoHomeDir)?;
        Ok(home.join(".formwright").join("forms.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl FormStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Form>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| StorageError::Read(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| StorageError::Parse(e.to_string()))
    }

    fn save(&self, forms: &[Form]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(forms)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Write(e.to_string()))?;
        }
        fs::write(&self.path, json).map_err(|e| StorageError::Write(e.to_string()))
    }
}

/// In-memory storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    forms: RwLock<Vec<Form>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start pre-populated, e.g. to simulate a previous session.
    pub fn with_forms(forms: Vec<Form>) -> Self {
        Self {
            forms: RwLock::new(forms),
        }
    }
}

impl FormStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Form>, StorageError> {
        Ok(self.forms.read().unwrap().clone())
    }

    fn save(&self, forms: &[Form]) -> Result<(), StorageError> {
        *self.forms.write().unwrap() = forms.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_common::{FieldDraft, FieldId, FieldType, Form};

    fn sample_form(name: &str) -> Form {
        let fields = vec![
            FieldDraft::template(FieldType::Text).into_field(FieldId::new(), 0),
            FieldDraft::template(FieldType::Select).into_field(FieldId::new(), 1),
        ];
        Form::snapshot(name, &fields)
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("forms.json"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.json");
        fs::write(&path, "{ not json").unwrap();

        let storage = JsonFileStorage::new(path);
        assert!(matches!(storage.load(), Err(StorageError::Parse(_))));
    }

    #[test]
    fn save_creates_parent_directories_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("forms.json");
        let storage = JsonFileStorage::new(&path);

        let forms = vec![sample_form("Contact"), sample_form("Survey")];
        storage.save(&forms).unwrap();

        assert!(path.exists());
        assert_eq!(storage.load().unwrap(), forms);
    }

    #[test]
    fn memory_storage_replaces_wholesale() {
        let storage = MemoryStorage::with_forms(vec![sample_form("Old")]);
        assert_eq!(storage.load().unwrap().len(), 1);

        storage.save(&[]).unwrap();
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn default_path_is_under_the_home_directory() {
        let path = JsonFileStorage::default_path().unwrap();
        assert!(path.ends_with(".formwright/forms.json"));
    }
}
