//! Client Generator: one client factory per table plus an index.

use tracing::info;

use super::crud::{CrudBinding, CrudOp};
use super::naming::{
    client_factory_name, client_type_name, index_path, module_path, type_name, CLIENTS_DIR,
    DATA_SERVICE_MODULE, DATA_SERVICE_TYPE, ROW_ID_TYPE, TYPES_MODULE,
};
use crate::artifact::{Expr, Function, Interface, Item, Member, Module, Param, TypeRef};
use crate::model::{EditSet, TableDescriptor};

/// Generates the client module for one table.
///
/// The module exports a `<Type>Client` interface and a
/// `create<Type>Client(service)` factory returning an object whose four
/// operations delegate to the injected data service.
pub fn generate_client(table: &TableDescriptor) -> Module {
    let binding = CrudBinding::new(table);
    let record = type_name(&table.name);
    let client_type = client_type_name(&table.name);

    let mut module = Module::new(module_path(CLIENTS_DIR, &table.name));

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
        names: vec![record],
        from: TYPES_MODULE.to_string(),
        type_only: true,
    });

    module.push(Item::Interface(Interface {
        name: client_type.clone(),
        doc: None,
        extends: None,
        members: CrudOp::ALL
            .iter()
            .map(|op| Member::Method {
                name: op.method_name().to_string(),
                type_params: vec![],
                params: binding.params(*op),
                returns: binding.returns(*op),
            })
            .collect(),
    }));

    module.push(Item::Function(Function {
        name: client_factory_name(&table.name),
        doc: Some(format!("Data-access client for `{}`.", table.name)),
        params: vec![Param::new("service", TypeRef::named(DATA_SERVICE_TYPE))],
        returns: TypeRef::named(client_type),
        body: Expr::Object(
            CrudOp::ALL
                .iter()
                .map(|op| {
                    (
                        op.method_name().to_string(),
                        Expr::Arrow {
                            params: binding.params(*op),
                            body: Box::new(binding.call(*op)),
                        },
                    )
                })
                .collect(),
        ),
    }));

    module
}

/// Generates the clients index re-exporting every client and record type.
pub fn generate_clients_index(edit_set: &EditSet) -> Module {
    let mut module = Module::new(index_path(CLIENTS_DIR));

    for table in &edit_set.tables {
        let from = module_path(CLIENTS_DIR, &table.name);
        module.push(Item::ReExport {
            names: vec![client_factory_name(&table.name)],
            from: from.clone(),
            type_only: false,
        });
        module.push(Item::ReExport {
            names: vec![client_type_name(&table.name)],
            from,
            type_only: true,
        });
    }

    if !edit_set.tables.is_empty() {
        module.push(Item::ReExport {
            names: edit_set.tables.iter().map(|t| type_name(&t.name)).collect(),
            from: TYPES_MODULE.to_string(),
            type_only: true,
        });
    }

    module
}

/// Generates every client module followed by the index.
pub fn generate_clients(edit_set: &EditSet) -> Vec<Module> {
    let mut modules: Vec<Module> = edit_set.tables.iter().map(generate_client).collect();
    modules.push(generate_clients_index(edit_set));
    info!(clients = edit_set.tables.len(), "clients generated");
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::emit::{Emitter, TypeScriptEmitter};
    use crate::model::{ColumnDef, PendingEdit};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_client_module() {
        let mut table = TableDescriptor::new("users");
        table.columns.push(PendingEdit::unchanged(ColumnDef::new("id", "uuid", false)));

        let rendered = TypeScriptEmitter.render(&generate_client(&table));
        let expected = "\
// Generated by schemagen. Do not edit by hand.

import type { TabularDataService } from '../runtime/data-service';
import type { Users } from '../types';

export interface UsersClient {
  getAll(): Promise<Users[]>;
  create(payload: Partial<Users>): Promise<Users>;
  updateById(id: string, payload: Partial<Users>): Promise<Users>;
  deleteById(id: string): Promise<void>;
}

/** Data-access client for `users`. */
export function createUsersClient(service: TabularDataService): UsersClient {
  return {
    getAll: () => service.select<Users>('users'),
    create: (payload: Partial<Users>) => service.insert<Users>('users', payload),
    updateById: (id: string, payload: Partial<Users>) => service.update<Users>('users', id, payload),
    deleteById: (id: string) => service.delete('users', id),
  };
}
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_row_id_import_without_id_column() {
        let table = TableDescriptor::new("tags");
        let rendered = TypeScriptEmitter.render(&generate_client(&table));
        assert!(rendered.contains("import type { TabularDataService, RowId } from '../runtime/data-service';"));
        assert!(rendered.contains("deleteById(id: RowId): Promise<void>;"));
    }

    #[test]
    fn test_clients_index_follows_declaration_order() {
        let edit_set = EditSet::new(vec![TableDescriptor::new("users"), TableDescriptor::new("classes")]);
        let rendered = TypeScriptEmitter.render(&generate_clients_index(&edit_set));
        let expected = "\
// Generated by schemagen. Do not edit by hand.

export { createUsersClient } from './users';
export type { UsersClient } from './users';
export { createClassesClient } from './classes';
export type { ClassesClient } from './classes';
export type { Users, Classes } from '../types';
";
        assert_eq!(rendered, expected);
    }
}
