//! Applies relation proposals to the Edit Set.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};

use super::strategy::{DeclaredRelation, DeclaredRelations, NamingConvention, RelationStrategy};
use crate::diagnostic::PipelineError;
use crate::model::{EditSet, PendingEdit, RelationKind};

/// Counts of what one inference run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceReport {
    pub belongs_to: usize,
    pub has_many: usize,
    pub many_to_many: usize,
    /// Junction tables behind the applied `many_to_many` relations, sorted.
    pub junction_tables: Vec<String>,
    /// Proposals dropped because a slot was already taken.
    pub conflicts: usize,
    /// Stale relation proposals removed from the Edit Set.
    pub stale: usize,
}

impl InferenceReport {
    pub fn total(&self) -> usize {
        self.belongs_to + self.has_many + self.many_to_many
    }
}

/// Runs relation strategies in precedence order and merges the result into
/// each table's `relations` map.
///
/// Relation entries without a source value (`old == None`) are owned by the
/// inferencer: on every run they are either re-proposed or removed, unless
/// they are marked deleted. Entries that came from the raw schema are only
/// ever refreshed. A refreshed entry keeps its `old` value and its delete
/// flag, so running the inferencer twice leaves the Edit Set unchanged.
pub struct Inferencer {
    strategies: Vec<Box<dyn RelationStrategy>>,
}

impl Default for Inferencer {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(NamingConvention)],
        }
    }
}

impl Inferencer {
    /// An inferencer with no strategies.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Declared relations first, then the naming heuristic.
    pub fn with_declarations(declarations: Vec<DeclaredRelation>) -> Self {
        let mut inferencer = Self::empty();
        if !declarations.is_empty() {
            inferencer = inferencer.with_strategy(DeclaredRelations::new(declarations));
        }
        inferencer.with_strategy(NamingConvention)
    }

    /// Appends a strategy with lower precedence than those already added.
    pub fn with_strategy(mut self, strategy: impl RelationStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn infer(&self, edit_set: &mut EditSet) -> Result<InferenceReport, PipelineError> {
        let mut report = InferenceReport::default();
        let mut claimed: HashSet<(String, String)> = HashSet::new();
        let mut junctions = BTreeSet::new();

        for strategy in &self.strategies {
            let proposals = strategy.propose(edit_set)?;
            debug!(strategy = strategy.name(), proposals = proposals.len(), "relation proposals");

            for proposal in proposals {
                let taken = proposal
                    .links
                    .iter()
                    .any(|l| claimed.contains(&(l.table.clone(), l.name.clone())));
                let unknown = proposal.links.iter().find(|l| !edit_set.contains(&l.table));
                if taken || unknown.is_some() {
                    debug!(strategy = strategy.name(), links = ?proposal.links, "dropping conflicting proposal");
                    report.conflicts += 1;
                    continue;
                }

                for link in proposal.links {
                    claimed.insert((link.table.clone(), link.name.clone()));

                    match link.relation.kind {
                        RelationKind::BelongsTo => report.belongs_to += 1,
                        RelationKind::HasMany => report.has_many += 1,
                        RelationKind::ManyToMany => {
                            report.many_to_many += 1;
                            if let Some(junction) = &link.relation.junction_table {
                                junctions.insert(junction.clone());
                            }
                        }
                    }

                    let Some(table) = edit_set.table_mut(&link.table) else {
                        continue;
                    };
                    match table.relations.get_mut(&link.name) {
                        Some(existing) => existing.new = link.relation,
                        None => {
                            table
                                .relations
                                .insert(link.name, PendingEdit::proposed(link.relation));
                        }
                    }
                }
            }
        }

        for table in &mut edit_set.tables {
            let before = table.relations.len();
            let table_name = table.name.clone();
            table.relations.retain(|name, edit| {
                edit.old.is_some() || edit.delete || claimed.contains(&(table_name.clone(), name.clone()))
            });
            report.stale += before - table.relations.len();
        }

        report.junction_tables = junctions.into_iter().collect();

        info!(
            belongs_to = report.belongs_to,
            has_many = report.has_many,
            many_to_many = report.many_to_many,
            junctions = report.junction_tables.len(),
            stale = report.stale,
            "relations inferred"
        );
        Ok(report)
    }
}
