//! Schema Snapshot Loader.
//!
//! Raw schema payloads come in three shapes:
//!
//! - an array of table objects
//! - an object of tables keyed by table name
//! - a wrapper object with a `tables` key holding either of the above
//!
//! A lone table object (`{ "name": ..., "columns": [...] }`) is accepted too.
//! Everything is normalized into an ordered list of [`RawTable`]s. Malformed
//! tables are skipped and reported instead of failing the whole load.

mod introspect;

pub use introspect::{introspect, SchemaIntrospector};
#[cfg(feature = "sqlite")]
pub use introspect::SqliteIntrospector;

use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::diagnostic::{PipelineError, SkippedTable};
use crate::model::{ColumnDef, RawTable, RelationDef};

/// The loader's output: accepted tables in source order plus the rejects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSchema {
    pub tables: Vec<RawTable>,
    pub skipped: Vec<SkippedTable>,
}

impl NormalizedSchema {
    fn accept(&mut self, location: String, result: Result<RawTable, String>) {
        let result = result.and_then(|table| {
            if self.contains(&table.name) {
                Err(format!("duplicate table name '{}'", table.name))
            } else {
                Ok(table)
            }
        });

        match result {
            Ok(table) => self.tables.push(table),
            Err(reason) => {
                warn!(location = %location, reason = %reason, "skipping malformed table");
                self.skipped.push(SkippedTable { location, reason });
            }
        }
    }

    /// Appends the tables of another source. `source` names it in the
    /// skip reports of tables already seen.
    fn extend(&mut self, source: &str, other: NormalizedSchema) {
        self.skipped.extend(other.skipped);
        for table in other.tables {
            let location = format!("{}:{}", source, table.name);
            self.accept(location, Ok(table));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
    }
}

/// Normalizes a raw payload of unknown shape.
pub fn normalize(payload: &Value) -> Result<NormalizedSchema, PipelineError> {
    let mut schema = NormalizedSchema::default();

    match payload {
        Value::Array(entries) => {
            for (index, entry) in entries.iter().enumerate() {
                schema.accept(format!("[{}]", index), table_from_value(None, entry));
            }
        }
        Value::Object(map) if is_wrapper(map) => {
            return match &map["tables"] {
                inner @ (Value::Array(_) | Value::Object(_)) => normalize(inner),
                other => Err(PipelineError::SchemaFormat {
                    reason: format!("'tables' must be an array or object, found {}", kind_of(other)),
                }),
            };
        }
        Value::Object(map) if is_single_table(map) => {
            schema.accept("[0]".to_string(), table_from_value(None, payload));
        }
        Value::Object(map) if map.values().all(|v| v.is_object() || v.is_array()) => {
            for (key, entry) in map {
                schema.accept(key.clone(), table_from_value(Some(key), entry));
            }
        }
        Value::Object(_) => {
            return Err(PipelineError::SchemaFormat {
                reason: "object is neither a table, a table map, nor a 'tables' wrapper".to_string(),
            });
        }
        other => {
            return Err(PipelineError::SchemaFormat {
                reason: format!("expected an array or object, found {}", kind_of(other)),
            });
        }
    }

    Ok(schema)
}

/// Reads and normalizes a single JSON schema file.
pub fn load_file(path: &Path) -> Result<NormalizedSchema, PipelineError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e.to_string()))?;
    let payload: Value =
        serde_json::from_str(&content).map_err(|e| PipelineError::json(path, e.to_string()))?;

    let mut schema = normalize(&payload)?;
    for skipped in &mut schema.skipped {
        skipped.location = format!("{}:{}", path.display(), skipped.location);
    }
    debug!(path = %path.display(), tables = schema.tables.len(), "loaded schema file");
    Ok(schema)
}

/// Loads a schema file, or every `*.json` file under a directory.
///
/// Directory entries are read in path order so that table order is stable.
pub fn load_path(path: &Path) -> Result<NormalizedSchema, PipelineError> {
    if !path.is_dir() {
        let schema = load_file(path)?;
        info!(tables = schema.tables.len(), skipped = schema.skipped.len(), "schema loaded");
        return Ok(schema);
    }

    let mut schema = NormalizedSchema::default();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| PipelineError::io(path, e.to_string()))?;
        let is_json = entry.path().extension().and_then(|ext| ext.to_str()) == Some("json");
        if entry.file_type().is_file() && is_json {
            schema.extend(&entry.path().display().to_string(), load_file(entry.path())?);
        }
    }

    info!(tables = schema.tables.len(), skipped = schema.skipped.len(), "schema loaded");
    Ok(schema)
}

/// A `tables` key makes a wrapper only when no other key holds a table;
/// otherwise `tables` is just a table named "tables".
fn is_wrapper(map: &Map<String, Value>) -> bool {
    map.contains_key("tables")
        && map
            .iter()
            .filter(|(key, _)| key.as_str() != "tables")
            .all(|(_, value)| !(value.is_object() || value.is_array()))
}

fn is_single_table(map: &Map<String, Value>) -> bool {
    matches!(map.get("name"), Some(Value::String(_))) && map.contains_key("columns")
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds a table from one payload entry. `key` is the map key, if any.
fn table_from_value(key: Option<&str>, value: &Value) -> Result<RawTable, String> {
    if let Value::Array(columns) = value {
        let name = key.filter(|k| !k.is_empty()).ok_or("missing table name")?;
        return Ok(RawTable::new(name, parse_columns(name, columns)));
    }

    let obj = value
        .as_object()
        .ok_or_else(|| format!("table entry is {}", kind_of(value)))?;

    let name = match obj.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.as_str(),
        Some(Value::String(_)) | None => key.filter(|k| !k.is_empty()).ok_or("missing table name")?,
        Some(other) => return Err(format!("table name is {}", kind_of(other))),
    };

    let columns = match obj.get("columns") {
        Some(Value::Array(columns)) => parse_columns(name, columns),
        Some(other) => return Err(format!("'columns' is {}, not a sequence", kind_of(other))),
        None => return Err("'columns' is missing".to_string()),
    };

    let mut table = RawTable::new(name, columns);

    match obj.get("fields") {
        Some(Value::Object(fields)) => {
            table.fields = fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        }
        Some(Value::Null) | None => {}
        Some(other) => warn!(table = %name, "ignoring 'fields': expected an object, found {}", kind_of(other)),
    }

    match obj.get("relations") {
        Some(Value::Object(relations)) => table.relations = parse_relations(name, relations),
        Some(Value::Null) | None => {}
        Some(other) => warn!(table = %name, "ignoring 'relations': expected an object, found {}", kind_of(other)),
    }

    Ok(table)
}

fn parse_columns(table: &str, columns: &[Value]) -> Vec<ColumnDef> {
    columns
        .iter()
        .filter_map(|raw| match serde_json::from_value::<ColumnDef>(raw.clone()) {
            Ok(col) if !col.name.is_empty() => Some(col),
            Ok(_) => {
                warn!(table = %table, "dropping column with an empty name");
                None
            }
            Err(e) => {
                warn!(table = %table, error = %e, "dropping malformed column");
                None
            }
        })
        .collect()
}

fn parse_relations(table: &str, relations: &Map<String, Value>) -> IndexMap<String, RelationDef> {
    relations
        .iter()
        .filter_map(|(name, raw)| match serde_json::from_value::<RelationDef>(raw.clone()) {
            Ok(rel) => Some((name.clone(), rel)),
            Err(e) => {
                warn!(table = %table, relation = %name, error = %e, "dropping malformed relation");
                None
            }
        })
        .collect()
}
