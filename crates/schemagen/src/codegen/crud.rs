//! The four CRUD bindings shared by clients and queries.

use crate::artifact::{Expr, Param, TypeRef};
use crate::model::TableDescriptor;
use super::naming::{type_name, ROW_ID_TYPE};
use super::types::id_type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOp {
    GetAll,
    Create,
    UpdateById,
    DeleteById,
}

impl CrudOp {
    pub const ALL: [CrudOp; 4] = [CrudOp::GetAll, CrudOp::Create, CrudOp::UpdateById, CrudOp::DeleteById];

    /// Member name on a client object.
    pub fn method_name(&self) -> &'static str {
        match self {
            CrudOp::GetAll => "getAll",
            CrudOp::Create => "create",
            CrudOp::UpdateById => "updateById",
            CrudOp::DeleteById => "deleteById",
        }
    }

    /// Standalone function name for a record type, e.g. `updateUsersById`.
    pub fn function_name(&self, type_name: &str) -> String {
        match self {
            CrudOp::GetAll => format!("getAll{}", type_name),
            CrudOp::Create => format!("create{}", type_name),
            CrudOp::UpdateById => format!("update{}ById", type_name),
            CrudOp::DeleteById => format!("delete{}ById", type_name),
        }
    }
}

/// One table's binding to the data service.
pub struct CrudBinding {
    table: String,
    record: TypeRef,
    id: TypeRef,
}

impl CrudBinding {
    pub fn new(table: &TableDescriptor) -> Self {
        Self {
            table: table.name.clone(),
            record: TypeRef::named(type_name(&table.name)),
            id: id_type(table),
        }
    }

    /// Whether the id parameter uses the shared `RowId` alias.
    pub fn uses_row_id(&self) -> bool {
        self.id == TypeRef::named(ROW_ID_TYPE)
    }

    pub fn params(&self, op: CrudOp) -> Vec<Param> {
        let payload = Param::new("payload", TypeRef::partial(self.record.clone()));
        let id = Param::new("id", self.id.clone());
        match op {
            CrudOp::GetAll => vec![],
            CrudOp::Create => vec![payload],
            CrudOp::UpdateById => vec![id, payload],
            CrudOp::DeleteById => vec![id],
        }
    }

    pub fn returns(&self, op: CrudOp) -> TypeRef {
        match op {
            CrudOp::GetAll => TypeRef::promise(TypeRef::array(self.record.clone())),
            CrudOp::Create | CrudOp::UpdateById => TypeRef::promise(self.record.clone()),
            CrudOp::DeleteById => TypeRef::promise(TypeRef::Void),
        }
    }

    /// The data-service call for `op`, addressed through `service`.
    pub fn call(&self, op: CrudOp) -> Expr {
        let (method, typed) = match op {
            CrudOp::GetAll => ("select", true),
            CrudOp::Create => ("insert", true),
            CrudOp::UpdateById => ("update", true),
            CrudOp::DeleteById => ("delete", false),
        };

        let mut args = vec![Expr::str(self.table.as_str())];
        args.extend(self.params(op).into_iter().map(|p| Expr::Ident(p.name)));

        Expr::Call {
            callee: format!("service.{}", method),
            type_args: if typed { vec![self.record.clone()] } else { vec![] },
            args,
        }
    }
}
