//! Schema data model shared by every pipeline stage.
//!
//! The raw shapes ([`RawTable`], [`RawColumn`]) come out of the loader. The
//! tracked shapes ([`TableDescriptor`] and the [`PendingEdit`] wrapper) make up
//! the persisted [`EditSet`] that all generators read.

mod edit;
mod raw;
mod sql_type;
mod table;

pub use edit::PendingEdit;
pub use raw::{RawColumn, RawTable};
pub use sql_type::SqlType;
pub use table::{ColumnDef, EditSet, Nullable, RelationDef, RelationKind, TableDescriptor};
