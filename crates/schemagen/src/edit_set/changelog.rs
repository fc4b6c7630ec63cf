//! Append-only change log of transformer runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostic::PipelineError;

/// The kind of schema entity a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Table,
    Column,
    Field,
    Relation,
}

/// What happened to the entity in the raw source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Added,
    Updated,
    Removed,
}

/// A single change between the previous Edit Set and the raw source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub table: String,
    pub entity: EntityKind,
    pub name: String,
    pub action: ChangeAction,
}

/// One transformer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// RFC 3339 timestamp of the run.
    pub timestamp: String,
    pub changes: Vec<Change>,
}

impl ChangeLogEntry {
    /// Creates an entry stamped with the current time.
    pub fn now(changes: Vec<Change>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            changes,
        }
    }

    pub fn count(&self, action: ChangeAction) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }
}

/// The persisted list of change log entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    pub entries: Vec<ChangeLogEntry>,
}

impl ChangeLog {
    /// Load the change log, or an empty one if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io(path, e.to_string()))?;

        serde_json::from_str(&content)
            .map_err(|e| PipelineError::json(path, format!("Failed to parse change log: {}", e)))
    }

    /// Appends `entry` to the log stored at `path`.
    pub fn append(path: &Path, entry: ChangeLogEntry) -> Result<(), PipelineError> {
        let mut log = Self::load(path)?;
        log.entries.push(entry);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::io(parent, e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(&log)
            .map_err(|e| PipelineError::json(path, format!("Failed to serialize change log: {}", e)))?;
        std::fs::write(path, content).map_err(|e| PipelineError::io(path, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn change(name: &str, action: ChangeAction) -> Change {
        Change {
            table: "users".to_string(),
            entity: EntityKind::Column,
            name: name.to_string(),
            action,
        }
    }

    #[test]
    fn test_append_accumulates_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema-changelog.json");

        ChangeLog::append(&path, ChangeLogEntry::now(vec![change("id", ChangeAction::Added)])).unwrap();
        ChangeLog::append(&path, ChangeLogEntry::now(vec![])).unwrap();

        let log = ChangeLog::load(&path).unwrap();
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0].changes[0].name, "id");
        assert!(log.entries[1].changes.is_empty());
    }

    #[test]
    fn test_entry_serialization() {
        let entry = ChangeLogEntry {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            changes: vec![change("email", ChangeAction::Updated)],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["changes"][0]["entity"], "column");
        assert_eq!(json["changes"][0]["action"], "updated");
        assert_eq!(entry.count(ChangeAction::Updated), 1);
    }
}
