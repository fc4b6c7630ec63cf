//! Raw schema → Edit Set.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::changelog::{Change, ChangeAction, ChangeLogEntry, EntityKind};
use crate::model::{ColumnDef, EditSet, PendingEdit, RawTable, TableDescriptor};

/// How a run reconciles with the previous Edit Set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep pending edits: `old` tracks the source, diverged `new` values,
    /// delete flags and proposals survive.
    #[default]
    Merge,
    /// Re-derive everything from the source (`old == new`, nothing deleted).
    Overwrite,
}

/// Output of a transformer run.
#[derive(Debug, Clone)]
pub struct Transformation {
    pub edit_set: EditSet,
    pub entry: ChangeLogEntry,
}

/// Builds the Edit Set for `raw`, reconciling with `previous` under `policy`.
///
/// Tables come out in raw declaration order; a repeated table name keeps
/// its first occurrence. Tables only present in `previous` survive a merge
/// when they still hold proposed columns or fields.
pub fn transform(raw: &[RawTable], previous: Option<&EditSet>, policy: MergePolicy) -> Transformation {
    let mut changes = Vec::new();
    let mut tables: Vec<TableDescriptor> = Vec::with_capacity(raw.len());

    for raw_table in raw {
        if tables.iter().any(|t| t.name == raw_table.name) {
            warn!(table = %raw_table.name, "ignoring duplicate table");
            continue;
        }
        let prev = previous.and_then(|p| p.table(&raw_table.name));
        if prev.is_none() && previous.is_some() {
            changes.push(change(&raw_table.name, EntityKind::Table, &raw_table.name, ChangeAction::Added));
        }
        tables.push(transform_table(raw_table, prev, policy, &mut changes));
    }

    if let Some(previous) = previous {
        for old_table in &previous.tables {
            if raw.iter().any(|t| t.name == old_table.name) {
                continue;
            }
            let empty = RawTable::new(old_table.name.clone(), Vec::new());
            let kept = transform_table(&empty, Some(old_table), policy, &mut changes);
            // Relations alone never keep a dropped table.
            if kept.columns.is_empty() && kept.fields.is_empty() {
                changes.push(change(&old_table.name, EntityKind::Table, &old_table.name, ChangeAction::Removed));
            } else {
                debug!(table = %old_table.name, "keeping table with proposed entities");
                tables.push(kept);
            }
        }
    }

    let entry = ChangeLogEntry::now(changes);
    info!(
        tables = tables.len(),
        added = entry.count(ChangeAction::Added),
        updated = entry.count(ChangeAction::Updated),
        removed = entry.count(ChangeAction::Removed),
        "edit set transformed"
    );

    Transformation {
        edit_set: EditSet::new(tables),
        entry,
    }
}

fn transform_table(
    raw: &RawTable,
    previous: Option<&TableDescriptor>,
    policy: MergePolicy,
    changes: &mut Vec<Change>,
) -> TableDescriptor {
    let name = raw.name.as_str();

    let columns = reconcile(
        name,
        EntityKind::Column,
        raw.columns.iter().map(|c| (c.name.clone(), c.clone())),
        previous
            .map(|p| p.columns.iter().map(|e| (source_name(e), e)).collect())
            .unwrap_or_default(),
        policy,
        changes,
    );

    let fields = reconcile(
        name,
        EntityKind::Field,
        raw.fields.iter().map(|(k, v)| (k.clone(), v.clone())),
        previous
            .map(|p| p.fields.iter().map(|(k, e)| (k.clone(), e)).collect())
            .unwrap_or_default(),
        policy,
        changes,
    );

    let relations = reconcile(
        name,
        EntityKind::Relation,
        raw.relations.iter().map(|(k, v)| (k.clone(), v.clone())),
        previous
            .map(|p| p.relations.iter().map(|(k, e)| (k.clone(), e)).collect())
            .unwrap_or_default(),
        policy,
        changes,
    );

    TableDescriptor {
        name: raw.name.clone(),
        columns: columns.into_values().collect(),
        fields,
        relations,
    }
}

/// Reconciles one entity family of a table.
///
/// Under [`MergePolicy::Merge`] a previous entry keeps its `new` value and
/// delete flag only while it is pending; an entry that matched its source
/// follows the source. Entries without a source counterpart are kept only
/// if they are proposals (`old == None`).
fn reconcile<'a, T>(
    table: &str,
    entity: EntityKind,
    raw: impl Iterator<Item = (String, T)>,
    previous: Vec<(String, &'a PendingEdit<T>)>,
    policy: MergePolicy,
    changes: &mut Vec<Change>,
) -> IndexMap<String, PendingEdit<T>>
where
    T: Clone + PartialEq + 'a,
{
    let mut out = IndexMap::new();

    for (name, value) in raw {
        if out.contains_key(&name) {
            debug!(table = %table, name = %name, "ignoring duplicate {:?}", entity);
            continue;
        }

        let prev = previous.iter().find(|(n, _)| *n == name).map(|(_, e)| *e);
        match prev {
            None => changes.push(change(table, entity, &name, ChangeAction::Added)),
            Some(p) if p.old.as_ref() != Some(&value) => {
                changes.push(change(table, entity, &name, ChangeAction::Updated))
            }
            Some(_) => {}
        }

        let edit = match (policy, prev) {
            (MergePolicy::Merge, Some(p)) if p.is_pending() => PendingEdit {
                old: Some(value),
                new: p.new.clone(),
                delete: p.delete,
            },
            _ => PendingEdit::unchanged(value),
        };
        out.insert(name, edit);
    }

    for (name, prev) in previous {
        if out.contains_key(&name) {
            continue;
        }
        if policy == MergePolicy::Merge && prev.old.is_none() {
            out.insert(name, prev.clone());
        } else {
            changes.push(change(table, entity, &name, ChangeAction::Removed));
        }
    }

    out
}

/// Columns are matched on their source name; `new` may carry a rename.
fn source_name(edit: &PendingEdit<ColumnDef>) -> String {
    edit.old.as_ref().unwrap_or(&edit.new).name.clone()
}

fn change(table: &str, entity: EntityKind, name: &str, action: ChangeAction) -> Change {
    Change {
        table: table.to_string(),
        entity,
        name: name.to_string(),
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationDef;
    use pretty_assertions::assert_eq;

    fn users(columns: Vec<ColumnDef>) -> RawTable {
        RawTable::new("users", columns)
    }

    #[test]
    fn test_initial_run_wraps_everything() {
        let mut raw = users(vec![ColumnDef::new("id", "uuid", false)]);
        raw.fields.insert("label".to_string(), serde_json::json!("User"));
        raw.relations.insert("posts".to_string(), RelationDef::has_many("posts", "user_id"));

        let result = transform(&[raw], None, MergePolicy::Merge);
        let table = &result.edit_set.tables[0];

        assert_eq!(table.columns[0], PendingEdit::unchanged(ColumnDef::new("id", "uuid", false)));
        assert_eq!(table.fields["label"].new, serde_json::json!("User"));
        assert!(!table.relations["posts"].delete);
        assert_eq!(result.entry.count(ChangeAction::Added), 3);
    }

    #[test]
    fn test_merge_preserves_pending_edits() {
        let raw = vec![users(vec![
            ColumnDef::new("id", "uuid", false),
            ColumnDef::new("age", "integer", true),
        ])];
        let mut previous = transform(&raw, None, MergePolicy::Merge).edit_set;
        {
            let table = previous.table_mut("users").unwrap();
            table.columns[1].new.data_type = "bigint".to_string();
            table.columns[0].delete = true;
            table
                .columns
                .push(PendingEdit::proposed(ColumnDef::new("nickname", "text", true)));
        }

        let merged = transform(&raw, Some(&previous), MergePolicy::Merge);
        let table = merged.edit_set.table("users").unwrap();

        assert!(table.columns[0].delete);
        assert_eq!(table.columns[1].old.as_ref().unwrap().data_type, "integer");
        assert_eq!(table.columns[1].new.data_type, "bigint");
        assert_eq!(table.columns[2].new.name, "nickname");
        assert!(merged.entry.changes.is_empty());
    }

    #[test]
    fn test_merge_follows_source_for_settled_entries() {
        let before = vec![users(vec![ColumnDef::new("age", "integer", true)])];
        let previous = transform(&before, None, MergePolicy::Merge).edit_set;

        let after = vec![users(vec![ColumnDef::new("age", "bigint", true)])];
        let merged = transform(&after, Some(&previous), MergePolicy::Merge);
        let column = &merged.edit_set.tables[0].columns[0];

        assert_eq!(column.new.data_type, "bigint");
        assert!(!column.is_pending());
        assert_eq!(merged.entry.count(ChangeAction::Updated), 1);
    }

    #[test]
    fn test_overwrite_discards_pending_edits() {
        let raw = vec![users(vec![ColumnDef::new("age", "integer", true)])];
        let mut previous = transform(&raw, None, MergePolicy::Overwrite).edit_set;
        previous.tables[0].columns[0].new.data_type = "bigint".to_string();
        previous.tables[0]
            .columns
            .push(PendingEdit::proposed(ColumnDef::new("nickname", "text", true)));

        let result = transform(&raw, Some(&previous), MergePolicy::Overwrite);
        let table = &result.edit_set.tables[0];

        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].new.data_type, "integer");
        assert_eq!(result.entry.count(ChangeAction::Removed), 1);
    }

    #[test]
    fn test_dropped_tables_are_removed_unless_proposed() {
        let raw = vec![
            users(vec![ColumnDef::new("id", "uuid", false)]),
            RawTable::new("legacy", vec![ColumnDef::new("id", "uuid", false)]),
        ];
        let mut previous = transform(&raw, None, MergePolicy::Merge).edit_set;
        let mut drafts = TableDescriptor::new("drafts");
        drafts
            .columns
            .push(PendingEdit::proposed(ColumnDef::new("id", "uuid", false)));
        previous.tables.push(drafts);

        let result = transform(&raw[..1], Some(&previous), MergePolicy::Merge);
        let names: Vec<&str> = result.edit_set.tables.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["users", "drafts"]);
        assert!(result.entry.changes.iter().any(|c| {
            c.entity == EntityKind::Table && c.name == "legacy" && c.action == ChangeAction::Removed
        }));
    }

    #[test]
    fn test_dropped_table_with_only_inferred_relations_is_removed() {
        let raw = vec![
            RawTable::new("children", vec![ColumnDef::new("class_id", "uuid", false)]),
            RawTable::new("classes", vec![ColumnDef::new("id", "uuid", false)]),
        ];
        let mut previous = transform(&raw, None, MergePolicy::Merge).edit_set;
        previous.table_mut("classes").unwrap().relations.insert(
            "childrens".to_string(),
            PendingEdit::proposed(RelationDef::has_many("children", "class_id")),
        );

        let result = transform(&raw[..1], Some(&previous), MergePolicy::Merge);

        assert!(!result.edit_set.contains("classes"));
        assert!(result.entry.changes.iter().any(|c| {
            c.entity == EntityKind::Table && c.name == "classes" && c.action == ChangeAction::Removed
        }));
    }

    #[test]
    fn test_duplicate_tables_keep_first() {
        let raw = vec![
            users(vec![ColumnDef::new("id", "uuid", false)]),
            users(vec![ColumnDef::new("id", "text", false)]),
        ];
        let result = transform(&raw, None, MergePolicy::Merge);
        assert_eq!(result.edit_set.tables.len(), 1);
        assert_eq!(result.edit_set.tables[0].columns[0].new.data_type, "uuid");
    }

    #[test]
    fn test_duplicate_columns_keep_first() {
        let raw = vec![users(vec![
            ColumnDef::new("id", "uuid", false),
            ColumnDef::new("id", "text", false),
        ])];
        let result = transform(&raw, None, MergePolicy::Merge);
        assert_eq!(result.edit_set.tables[0].columns.len(), 1);
        assert_eq!(result.edit_set.tables[0].columns[0].new.data_type, "uuid");
    }
}
