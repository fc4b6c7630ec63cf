//! Relationship Inferencer.
//!
//! Relations are proposed by pluggable [`RelationStrategy`]s and written back
//! into the Edit Set by the [`Inferencer`]:
//!
//! - [`DeclaredRelations`] applies explicit declarations from configuration.
//! - [`NamingConvention`] derives `belongs_to`/`has_many` pairs from `*_id`
//!   columns and `many_to_many` pairs from junction-shaped table names.
//!
//! Strategies run in precedence order; a relation slot (table + name) taken
//! by an earlier proposal is never overwritten by a later one.

mod infer;
mod pluralize;
mod strategy;

pub use infer::{InferenceReport, Inferencer};
pub use pluralize::{pluralize, resolve_table};
pub use strategy::{
    DeclaredRelation, DeclaredRelations, NamingConvention, ProposedLink, RelationProposal,
    RelationStrategy,
};
