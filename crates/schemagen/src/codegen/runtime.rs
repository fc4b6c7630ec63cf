//! The data-service contract every generated client and query binds to.

use crate::artifact::{Interface, Item, Member, Module, Param, TypeRef};
use super::naming::{DATA_SERVICE_MODULE, DATA_SERVICE_TYPE, ROW_ID_TYPE};

/// Generates the `TabularDataService` interface module.
///
/// Generated code never constructs a connection; callers pass an
/// implementation of this interface in.
pub fn generate_data_service() -> Module {
    let mut module = Module::new(DATA_SERVICE_MODULE);

    module.push(Item::TypeAlias {
        name: ROW_ID_TYPE.to_string(),
        ty: TypeRef::Union(vec![TypeRef::String, TypeRef::Number]),
    });

    let t = || TypeRef::named("T");
    let table = || Param::new("table", TypeRef::String);
    let id = || Param::new("id", TypeRef::named(ROW_ID_TYPE));
    let payload = || Param::new("payload", TypeRef::partial(TypeRef::named("T")));

    module.push(Item::Interface(Interface {
        name: DATA_SERVICE_TYPE.to_string(),
        doc: Some("Tabular data store addressed by table name. Errors propagate to the caller as-is.".to_string()),
        extends: None,
        members: vec![
            Member::Method {
                name: "select".to_string(),
                type_params: vec!["T".to_string()],
                params: vec![table()],
                returns: TypeRef::promise(TypeRef::array(t())),
            },
            Member::Method {
                name: "insert".to_string(),
                type_params: vec!["T".to_string()],
                params: vec![table(), payload()],
                returns: TypeRef::promise(t()),
            },
            Member::Method {
                name: "update".to_string(),
                type_params: vec!["T".to_string()],
                params: vec![table(), id(), payload()],
                returns: TypeRef::promise(t()),
            },
            Member::Method {
                name: "delete".to_string(),
                type_params: vec![],
                params: vec![table(), id()],
                returns: TypeRef::promise(TypeRef::Void),
            },
        ],
    }));

    module
}
