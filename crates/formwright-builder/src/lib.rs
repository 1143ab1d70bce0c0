//! Formwright builder core
//!
//! The stateful half of Formwright. [`FormStore`] owns the working field
//! collection and the saved-form library, with durable persistence
//! behind the [`FormStorage`] trait. [`PreviewSession`] runs a live
//! preview over a snapshot of the working collection: seeding defaults,
//! recomputing derived fields on every edit, and validating the whole
//! form on submission.
//!
//! Everything here is synchronous and single-threaded: each operation
//! runs to completion before the next, and persistence is a plain write
//! inside the mutation that triggered it.

pub mod preview;
pub mod storage;
pub mod store;

pub use preview::{PreviewIssue, PreviewSession, Submission};
pub use storage::{FormStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::FormStore;
