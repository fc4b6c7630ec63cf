//! Query Generator: standalone CRUD functions per table plus an index.

use tracing::{debug, info};

use super::crud::{CrudBinding, CrudOp};
use super::naming::{
    index_path, module_path, type_name, DATA_SERVICE_MODULE, DATA_SERVICE_TYPE, QUERIES_DIR,
    RELATION_SELECTS, ROW_ID_TYPE, TYPES_MODULE,
};
use crate::artifact::{Function, Item, Module, Param, TypeRef};
use crate::model::{EditSet, TableDescriptor};

/// Generates the query module for one table.
///
/// Each function takes the data service first, then the id and/or payload.
pub fn generate_query(table: &TableDescriptor) -> Module {
    let binding = CrudBinding::new(table);
    let record = type_name(&table.name);

    let mut module = Module::new(module_path(QUERIES_DIR, &table.name));

    let mut service_imports = vec![DATA_SERVICE_TYPE.to_string()];
    if binding.uses_row_id() {
        service_imports.push(ROW_ID_TYPE.to_string());
    }
    module.push(Item::Import {
        names: service_imports,
        from: DATA_SERVICE_MODULE.to_string(),
        type_only: true,
    });
    module.push(Item::Import {
        names: vec![record.clone()],
        from: TYPES_MODULE.to_string(),
        type_only: true,
    });

    for op in CrudOp::ALL {
        let mut params = vec![Param::new("service", TypeRef::named(DATA_SERVICE_TYPE))];
        params.extend(binding.params(op));

        module.push(Item::Function(Function {
            name: op.function_name(&record),
            doc: None,
            params,
            returns: binding.returns(op),
            body: binding.call(op),
        }));
    }

    module
}

/// Generates the queries index: every query module plus the relation
/// select lookup.
pub fn generate_queries_index(tables: &[&TableDescriptor]) -> Module {
    let mut module = Module::new(index_path(QUERIES_DIR));

    for table in tables {
        module.push(Item::ReExportAll {
            from: module_path(QUERIES_DIR, &table.name),
        });
    }
    module.push(Item::ReExport {
        names: vec![RELATION_SELECTS.to_string()],
        from: TYPES_MODULE.to_string(),
        type_only: false,
    });

    module
}

/// Generates query modules for every table with at least one active
/// column, followed by the index.
pub fn generate_queries(edit_set: &EditSet) -> Vec<Module> {
    let tables: Vec<&TableDescriptor> = edit_set
        .tables
        .iter()
        .filter(|table| {
            let keep = table.has_active_columns();
            if !keep {
                debug!(table = %table.name, "no active columns, skipping queries");
            }
            keep
        })
        .collect();

    let mut modules: Vec<Module> = tables.iter().map(|table| generate_query(table)).collect();
    modules.push(generate_queries_index(&tables));
    info!(queries = tables.len(), "queries generated");
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::emit::{Emitter, TypeScriptEmitter};
    use crate::model::{ColumnDef, PendingEdit};
    use pretty_assertions::assert_eq;

    fn table(name: &str, columns: &[(&str, &str)]) -> TableDescriptor {
        let mut t = TableDescriptor::new(name);
        for (col, typ) in columns {
            t.columns.push(PendingEdit::unchanged(ColumnDef::new(*col, *typ, false)));
        }
        t
    }

    #[test]
    fn test_query_module() {
        let rendered = TypeScriptEmitter.render(&generate_query(&table("classes", &[("id", "integer")])));
        let expected = "\
// Generated by schemagen. Do not edit by hand.

import type { TabularDataService } from '../runtime/data-service';
import type { Classes } from '../types';

export function getAllClasses(service: TabularDataService): Promise<Classes[]> {
  return service.select<Classes>('classes');
}

export function createClasses(service: TabularDataService, payload: Partial<Classes>): Promise<Classes> {
  return service.insert<Classes>('classes', payload);
}

export function updateClassesById(service: TabularDataService, id: number, payload: Partial<Classes>): Promise<Classes> {
  return service.update<Classes>('classes', id, payload);
}

export function deleteClassesById(service: TabularDataService, id: number): Promise<void> {
  return service.delete('classes', id);
}
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_tables_without_active_columns_are_skipped() {
        let mut archived = table("archived", &[("id", "uuid")]);
        archived.columns[0].delete = true;
        let edit_set = EditSet::new(vec![table("users", &[("id", "uuid")]), archived, table("empty", &[])]);

        let modules = generate_queries(&edit_set);
        let paths: Vec<&str> = modules.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["queries/users", "queries/index"]);

        let index = TypeScriptEmitter.render(&modules[1]);
        assert!(index.contains("export * from './users';\nexport { relationSelects } from '../types';"));
        assert!(!index.contains("archived"));
    }
}
