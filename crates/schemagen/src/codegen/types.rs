//! Type Generator: record types, relation-extended types and the relation
//! select lookup.

use tracing::{info, warn};

use super::naming::{type_name, with_relations_name, RELATION_SELECTS, ROW_ID_TYPE, TYPES_MODULE};
use crate::artifact::{Expr, Interface, Item, Member, Module, TypeRef};
use crate::model::{EditSet, RelationDef, RelationKind, SqlType, TableDescriptor};

/// Maps a source SQL type name to a generated type.
///
/// Unknown types become the untyped placeholder.
pub fn column_type(data_type: &str) -> TypeRef {
    sql_type_to_ts(&SqlType::parse(data_type))
}

fn sql_type_to_ts(sql: &SqlType) -> TypeRef {
    match sql {
        SqlType::Uuid | SqlType::Text | SqlType::Temporal => TypeRef::String,
        SqlType::Boolean => TypeRef::Boolean,
        SqlType::Integer | SqlType::Float => TypeRef::Number,
        SqlType::Json | SqlType::Unknown => TypeRef::Any,
        SqlType::Array(inner) => TypeRef::array(sql_type_to_ts(inner)),
    }
}

/// Type of the row id used by update/delete: the table's active `id`
/// column if it has a concrete type, else the shared `RowId` alias.
pub fn id_type(table: &TableDescriptor) -> TypeRef {
    match table.active_column("id").map(|c| column_type(&c.data_type)) {
        Some(TypeRef::Any) | None => TypeRef::named(ROW_ID_TYPE),
        Some(ty) => ty,
    }
}

/// Active relations of `table` whose target table exists in the Edit Set,
/// in relation-map order.
pub fn resolvable_relations<'a>(
    edit_set: &EditSet,
    table: &'a TableDescriptor,
) -> Vec<(&'a str, &'a RelationDef)> {
    table
        .active_relations()
        .filter(|(_, rel)| edit_set.contains(&rel.foreign_table))
        .collect()
}

/// Select expression fetching `table` with every immediate relation, e.g.
/// `*, class:classes!class_id(*)`. Related rows are not expanded further.
pub fn select_expression(edit_set: &EditSet, table: &TableDescriptor) -> String {
    let mut expr = String::from("*");
    for (name, rel) in resolvable_relations(edit_set, table) {
        let hint = match rel.kind {
            RelationKind::ManyToMany => rel.junction_table.as_deref().unwrap_or(&rel.foreign_key),
            RelationKind::BelongsTo | RelationKind::HasMany => rel.foreign_key.as_str(),
        };
        expr.push_str(&format!(", {}:{}!{}(*)", name, rel.foreign_table, hint));
    }
    expr
}

fn base_interface(table: &TableDescriptor) -> Interface {
    Interface {
        name: type_name(&table.name),
        doc: Some(format!("Row of `{}`.", table.name)),
        extends: None,
        members: table
            .active_columns()
            .map(|col| Member::Property {
                name: col.name.clone(),
                ty: column_type(&col.data_type),
                optional: col.is_nullable(),
            })
            .collect(),
    }
}

/// A base type without columns is emitted as `Record<string, never>`, which
/// cannot be extended with properties, so the relations interface then
/// stands alone.
fn relations_interface(table: &TableDescriptor, relations: &[(&str, &RelationDef)]) -> Interface {
    Interface {
        name: with_relations_name(&table.name),
        doc: None,
        extends: table.has_active_columns().then(|| type_name(&table.name)),
        members: relations
            .iter()
            .map(|(name, rel)| {
                let nested = TypeRef::named(type_name(&rel.foreign_table));
                Member::Property {
                    name: name.to_string(),
                    ty: if rel.kind.is_collection() {
                        TypeRef::array(nested)
                    } else {
                        nested
                    },
                    optional: true,
                }
            })
            .collect(),
    }
}

/// Generates the types module for every table in the Edit Set.
pub fn generate_types(edit_set: &EditSet) -> Module {
    let mut module = Module::new(TYPES_MODULE);

    for table in &edit_set.tables {
        module.push(Item::Interface(base_interface(table)));
    }

    let mut extended = 0;
    for table in &edit_set.tables {
        for (name, rel) in table.active_relations() {
            if !edit_set.contains(&rel.foreign_table) {
                warn!(
                    table = %table.name,
                    relation = %name,
                    target = %rel.foreign_table,
                    "skipping relation to unknown table"
                );
            }
        }

        let relations = resolvable_relations(edit_set, table);
        if relations.is_empty() {
            continue;
        }
        module.push(Item::Interface(relations_interface(table, &relations)));
        extended += 1;
    }

    let selects = edit_set
        .tables
        .iter()
        .map(|table| (table.name.clone(), Expr::Str(select_expression(edit_set, table))))
        .collect();
    module.push(Item::Const {
        name: RELATION_SELECTS.to_string(),
        ty: Some(TypeRef::generic("Record", vec![TypeRef::String, TypeRef::String])),
        value: Expr::Object(selects),
    });

    info!(tables = edit_set.tables.len(), with_relations = extended, "types generated");
    module
}
