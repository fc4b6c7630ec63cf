//! Names of generated modules and declarations.

use std::collections::HashMap;

use heck::ToUpperCamelCase;

use crate::model::EditSet;

/// Module holding every record type and the relation select lookup.
pub const TYPES_MODULE: &str = "types";
/// Module declaring the data-service contract.
pub const DATA_SERVICE_MODULE: &str = "runtime/data-service";
pub const CLIENTS_DIR: &str = "clients";
pub const QUERIES_DIR: &str = "queries";

pub const DATA_SERVICE_TYPE: &str = "TabularDataService";
pub const ROW_ID_TYPE: &str = "RowId";
pub const RELATION_SELECTS: &str = "relationSelects";

/// Record type name for a table: `parent_child_relationships` →
/// `ParentChildRelationships`. A leading digit gets a `_` prefix.
pub fn type_name(table: &str) -> String {
    let name = table.to_upper_camel_case();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}

/// Pairs of tables whose names map to the same type name, e.g.
/// `user_roles` and `userRoles`. Each pair is `(first, later)` in
/// declaration order.
pub fn type_name_collisions(edit_set: &EditSet) -> Vec<(String, String)> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut collisions = Vec::new();
    for table in &edit_set.tables {
        match seen.get(&type_name(&table.name)) {
            Some(first) => collisions.push((first.to_string(), table.name.clone())),
            None => {
                seen.insert(type_name(&table.name), &table.name);
            }
        }
    }
    collisions
}

pub fn with_relations_name(table: &str) -> String {
    format!("{}WithRelations", type_name(table))
}

pub fn client_type_name(table: &str) -> String {
    format!("{}Client", type_name(table))
}

pub fn client_factory_name(table: &str) -> String {
    format!("create{}Client", type_name(table))
}

pub fn module_path(dir: &str, table: &str) -> String {
    format!("{}/{}", dir, table)
}

pub fn index_path(dir: &str) -> String {
    format!("{}/index", dir)
}
