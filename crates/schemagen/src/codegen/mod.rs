//! Artifact generation from the Edit Set.
//!
//! Generators are pure functions of the Edit Set: the same input yields the
//! same modules, in the same order. Per-table modules follow table
//! declaration order, as do the index modules.
//!
//! - Types: record types, `WithRelations` types, relation select lookup
//! - Clients: a factory per table bound to an injected data service
//! - Queries: standalone CRUD functions per table
//! - Runtime: the data-service contract both of the above bind to

mod crud;
pub mod clients;
pub mod naming;
pub mod queries;
pub mod runtime;
pub mod types;

use tracing::{info, warn};

use crate::artifact::ArtifactSet;
use crate::model::EditSet;

/// Generates the complete artifact set.
pub fn generate(edit_set: &EditSet) -> ArtifactSet {
    for (first, later) in naming::type_name_collisions(edit_set) {
        warn!(
            first = %first,
            later = %later,
            type_name = %naming::type_name(&later),
            "tables map to the same type name"
        );
    }

    let mut artifacts = ArtifactSet::default();

    artifacts.extend([runtime::generate_data_service()]);
    artifacts.extend([types::generate_types(edit_set)]);
    artifacts.extend(clients::generate_clients(edit_set));
    artifacts.extend(queries::generate_queries(edit_set));

    info!(modules = artifacts.modules.len(), "artifacts generated");
    artifacts
}
