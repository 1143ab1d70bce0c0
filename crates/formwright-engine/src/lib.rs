//! Formwright field engines
//!
//! The two pure engines over the shared model:
//! - **validate**: walks a field's rule list against a candidate value
//!   and collects failure messages, in rule order, without
//!   short-circuiting.
//! - **derive**: computes a derived field's value from its parents'
//!   values through a keyword selector (age, sum, concat).
//!
//! Both are synchronous and side-effect free: same inputs, same outputs.

pub mod derive;
pub mod validate;

pub use derive::{compute, compute_at, DerivedLogic, ParentValues};
pub use validate::FieldValidator;
