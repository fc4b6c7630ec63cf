//! Edit-Set Transformer and change log.
//!
//! The transformer wraps every raw column, field and relation into a
//! [`PendingEdit`](crate::model::PendingEdit) and reconciles the result with
//! the Edit Set from the previous run. Each run appends one entry to the
//! change log describing what moved in the source schema.

pub mod changelog;
pub mod transform;

pub use changelog::{Change, ChangeAction, ChangeLog, ChangeLogEntry, EntityKind};
pub use transform::{transform, MergePolicy, Transformation};
