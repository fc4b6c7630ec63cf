//! Normalized raw schema shapes produced by the loader.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::table::{ColumnDef, RelationDef};

/// Raw columns share the descriptor shape.
pub type RawColumn = ColumnDef;

/// A table exactly as the schema source describes it, before change tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub fields: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub relations: IndexMap<String, RelationDef>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, columns: Vec<RawColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            fields: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }
}
