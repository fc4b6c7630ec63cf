//! Table descriptors and the persisted Edit Set.
//!
//! The Edit Set file (`schema-edits.json` by default) is a JSON array of table
//! descriptors. It is the only state carried between pipeline runs.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::edit::PendingEdit;
use crate::diagnostic::PipelineError;

/// Column nullability as found in schema sources.
///
/// Descriptor files use booleans; information-schema style sources report
/// `"YES"`/`"NO"`. The original spelling is preserved on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nullable {
    Flag(bool),
    Text(String),
}

impl Nullable {
    pub fn is_nullable(&self) -> bool {
        match self {
            Nullable::Flag(flag) => *flag,
            Nullable::Text(text) => {
                text.eq_ignore_ascii_case("yes") || text.eq_ignore_ascii_case("true")
            }
        }
    }
}

impl Default for Nullable {
    fn default() -> Self {
        Nullable::Flag(false)
    }
}

/// A single column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(alias = "column_name")]
    pub name: String,

    /// Source SQL type name, e.g. `uuid` or `timestamp with time zone`.
    #[serde(rename = "type", alias = "data_type", default)]
    pub data_type: String,

    #[serde(default, alias = "is_nullable")]
    pub nullable: Nullable,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: Nullable::Flag(nullable),
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.is_nullable()
    }
}

/// Relation cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    BelongsTo,
    HasMany,
    ManyToMany,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::HasMany => "has_many",
            RelationKind::ManyToMany => "many_to_many",
        }
    }

    /// Whether the related side is a collection.
    pub fn is_collection(&self) -> bool {
        !matches!(self, RelationKind::BelongsTo)
    }
}

/// A relation from one table to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub foreign_table: String,
    pub foreign_key: String,
    #[serde(default = "default_local_key")]
    pub local_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction_table: Option<String>,
}

fn default_local_key() -> String {
    "id".to_string()
}

impl RelationDef {
    pub fn belongs_to(foreign_table: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::BelongsTo,
            foreign_table: foreign_table.into(),
            foreign_key: foreign_key.into(),
            local_key: default_local_key(),
            junction_table: None,
        }
    }

    pub fn has_many(foreign_table: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::HasMany,
            foreign_table: foreign_table.into(),
            foreign_key: foreign_key.into(),
            local_key: default_local_key(),
            junction_table: None,
        }
    }

    pub fn many_to_many(
        foreign_table: impl Into<String>,
        foreign_key: impl Into<String>,
        local_key: impl Into<String>,
        junction_table: impl Into<String>,
    ) -> Self {
        Self {
            kind: RelationKind::ManyToMany,
            foreign_table: foreign_table.into(),
            foreign_key: foreign_key.into(),
            local_key: local_key.into(),
            junction_table: Some(junction_table.into()),
        }
    }
}

/// One schema table with change tracking on every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<PendingEdit<ColumnDef>>,
    #[serde(default)]
    pub fields: IndexMap<String, PendingEdit<serde_json::Value>>,
    #[serde(default)]
    pub relations: IndexMap<String, PendingEdit<RelationDef>>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            fields: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Non-deleted columns in declaration order.
    pub fn active_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter_map(|edit| edit.active())
    }

    /// Non-deleted relations in map order.
    pub fn active_relations(&self) -> impl Iterator<Item = (&str, &RelationDef)> {
        self.relations
            .iter()
            .filter_map(|(name, edit)| edit.active().map(|rel| (name.as_str(), rel)))
    }

    pub fn active_column(&self, name: &str) -> Option<&ColumnDef> {
        self.active_columns().find(|c| c.name == name)
    }

    pub fn has_active_columns(&self) -> bool {
        self.active_columns().next().is_some()
    }

    pub fn has_active_relations(&self) -> bool {
        self.active_relations().next().is_some()
    }
}

/// The full set of tracked tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditSet {
    pub tables: Vec<TableDescriptor>,
}

impl EditSet {
    pub fn new(tables: Vec<TableDescriptor>) -> Self {
        Self { tables }
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableDescriptor> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Table names sorted lexically, independent of declaration order.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }

    /// Total number of active relations across all tables.
    pub fn relation_count(&self) -> usize {
        self.tables.iter().map(|t| t.active_relations().count()).sum()
    }

    /// Load an Edit Set from disk.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, PipelineError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io(path, e.to_string()))?;

        let edit_set: Self = serde_json::from_str(&content)
            .map_err(|e| PipelineError::json(path, format!("Failed to parse edit set: {}", e)))?;

        Ok(Some(edit_set))
    }

    /// Save the Edit Set to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::io(parent, e.to_string()))?;
            }
        }

        let mut content = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::json(path, format!("Failed to serialize edit set: {}", e)))?;
        content.push('\n');

        std::fs::write(path, content).map_err(|e| PipelineError::io(path, e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_nullable_spellings() {
        assert!(Nullable::Flag(true).is_nullable());
        assert!(Nullable::Text("YES".to_string()).is_nullable());
        assert!(!Nullable::Text("NO".to_string()).is_nullable());
        assert!(!Nullable::default().is_nullable());
    }

    #[test]
    fn test_column_accepts_introspection_shape() {
        let col: ColumnDef = serde_json::from_str(
            r#"{"column_name": "due_date", "data_type": "date", "is_nullable": "YES"}"#,
        )
        .unwrap();
        assert_eq!(col.name, "due_date");
        assert_eq!(col.data_type, "date");
        assert!(col.is_nullable());
    }

    #[test]
    fn test_relation_serializes_snake_case_kind() {
        let rel = RelationDef::belongs_to("classes", "class_id");
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "belongs_to");
        assert_eq!(json["local_key"], "id");
        assert!(json.get("junction_table").is_none());
    }

    #[test]
    fn test_deleted_entities_are_filtered() {
        let mut table = TableDescriptor::new("users");
        table.columns.push(PendingEdit::unchanged(ColumnDef::new("id", "uuid", false)));
        let mut gone = PendingEdit::unchanged(ColumnDef::new("legacy", "text", true));
        gone.delete = true;
        table.columns.push(gone);

        let names: Vec<&str> = table.active_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id"]);
        assert!(table.active_column("legacy").is_none());
    }

    #[test]
    fn test_edit_set_roundtrip() {
        let mut table = TableDescriptor::new("classes");
        table.columns.push(PendingEdit::unchanged(ColumnDef::new("id", "uuid", false)));
        table.relations.insert(
            "childrens".to_string(),
            PendingEdit::unchanged(RelationDef::has_many("children", "class_id")),
        );
        let edit_set = EditSet::new(vec![table]);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("schema-edits.json");
        edit_set.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.trim_start().starts_with('['));

        let loaded = EditSet::load(&path).unwrap().unwrap();
        assert_eq!(loaded, edit_set);
    }

    #[test]
    fn test_load_nonexistent() {
        let dir = TempDir::new().unwrap();
        let loaded = EditSet::load(&dir.path().join("missing.json")).unwrap();
        assert!(loaded.is_none());
    }
}
