//! Relation proposal strategies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pluralize::{pluralize, resolve_table};
use crate::diagnostic::PipelineError;
use crate::model::{ColumnDef, EditSet, RelationDef, SqlType};

/// One relation to write into one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedLink {
    pub table: String,
    pub name: String,
    pub relation: RelationDef,
}

/// Links that are applied together or not at all.
///
/// Keeping both sides of a `belongs_to`/`has_many` pair in one proposal
/// means a slot conflict on either side drops the whole pair, so the pair
/// stays symmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationProposal {
    pub links: Vec<ProposedLink>,
}

impl RelationProposal {
    fn single(table: &str, name: &str, relation: RelationDef) -> Self {
        Self {
            links: vec![link(table, name, relation)],
        }
    }

    fn pair(first: ProposedLink, second: ProposedLink) -> Self {
        Self {
            links: vec![first, second],
        }
    }
}

fn link(table: &str, name: &str, relation: RelationDef) -> ProposedLink {
    ProposedLink {
        table: table.to_string(),
        name: name.to_string(),
        relation,
    }
}

/// A source of relation proposals.
pub trait RelationStrategy {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Proposes relations for the given Edit Set. Proposals are applied in
    /// the returned order.
    fn propose(&self, edit_set: &EditSet) -> Result<Vec<RelationProposal>, PipelineError>;
}

/// An explicit relation declaration from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRelation {
    pub table: String,
    pub name: String,
    pub relation: RelationDef,
}

/// Applies declared relations verbatim.
#[derive(Debug, Clone, Default)]
pub struct DeclaredRelations {
    declarations: Vec<DeclaredRelation>,
}

impl DeclaredRelations {
    pub fn new(declarations: Vec<DeclaredRelation>) -> Self {
        Self { declarations }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl RelationStrategy for DeclaredRelations {
    fn name(&self) -> &str {
        "declared"
    }

    fn propose(&self, edit_set: &EditSet) -> Result<Vec<RelationProposal>, PipelineError> {
        self.declarations
            .iter()
            .map(|decl| {
                let missing = [Some(&decl.table), Some(&decl.relation.foreign_table), decl.relation.junction_table.as_ref()]
                    .into_iter()
                    .flatten()
                    .find(|name| !edit_set.contains(name));

                match missing {
                    Some(name) => Err(PipelineError::InvalidDeclaration {
                        table: decl.table.clone(),
                        name: decl.name.clone(),
                        reason: format!("table '{}' does not exist", name),
                    }),
                    None => Ok(RelationProposal::single(&decl.table, &decl.name, decl.relation.clone())),
                }
            })
            .collect()
    }
}

/// Infers relations from column and table naming conventions.
///
/// - A column `<base>_id` of identifier type whose base resolves to a table
///   yields `belongs_to <base>` on the owner and `has_many
///   pluralize(<owner>)` on the referenced table.
/// - A table named `<a>_<b>[_...]` where `<a>` and `<b>` resolve to two other
///   distinct tables is a junction; each side gets a `many_to_many` named
///   after the pluralized other side.
///
/// Tables are visited in name order so the output does not depend on the
/// declaration order of the schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConvention;

impl NamingConvention {
    fn foreign_key_base(column: &ColumnDef) -> Option<&str> {
        let base = column.name.strip_suffix("_id")?;
        if base.is_empty() || !SqlType::parse(&column.data_type).is_identifier() {
            return None;
        }
        Some(base)
    }

    fn foreign_keys(edit_set: &EditSet, names: &[String], out: &mut Vec<RelationProposal>) {
        for owner in names {
            let Some(table) = edit_set.table(owner) else {
                continue;
            };

            for column in table.active_columns() {
                let Some(base) = Self::foreign_key_base(column) else {
                    continue;
                };
                let Some(target) = resolve_table(base, names) else {
                    debug!(table = %owner, column = %column.name, "no table matches foreign key");
                    continue;
                };

                out.push(RelationProposal::pair(
                    link(owner, base, RelationDef::belongs_to(target, &column.name)),
                    link(target, &pluralize(owner), RelationDef::has_many(owner, &column.name)),
                ));
            }
        }
    }

    fn junctions(names: &[String], out: &mut Vec<RelationProposal>) {
        for junction in names {
            let mut parts = junction.split('_');
            let (Some(a), Some(b)) = (parts.next(), parts.next()) else {
                continue;
            };
            if a.is_empty() || b.is_empty() {
                continue;
            }

            let (Some(left), Some(right)) = (resolve_table(a, names), resolve_table(b, names)) else {
                continue;
            };
            if left == right || left == junction || right == junction {
                continue;
            }

            debug!(junction = %junction, left = %left, right = %right, "junction table detected");
            out.push(RelationProposal::pair(
                link(
                    left,
                    &pluralize(b),
                    RelationDef::many_to_many(right, format!("{}_id", b), format!("{}_id", a), junction),
                ),
                link(
                    right,
                    &pluralize(a),
                    RelationDef::many_to_many(left, format!("{}_id", a), format!("{}_id", b), junction),
                ),
            ));
        }
    }
}

impl RelationStrategy for NamingConvention {
    fn name(&self) -> &str {
        "naming"
    }

    fn propose(&self, edit_set: &EditSet) -> Result<Vec<RelationProposal>, PipelineError> {
        let names = edit_set.sorted_names();
        let mut out = Vec::new();
        Self::foreign_keys(edit_set, &names, &mut out);
        Self::junctions(&names, &mut out);
        Ok(out)
    }
}
