//! Structured artifact model.
//!
//! Generators describe their output as [`Module`]s holding declarations
//! ([`Item`]s). An [`Emitter`](emit::Emitter) renders modules into source
//! text for one target language, so no generator builds source strings.
//!
//! Module paths are `/`-separated and extension-less (`clients/users`);
//! imports refer to other modules by the same path.

pub mod emit;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::diagnostic::PipelineError;
use emit::Emitter;

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    String,
    Number,
    Boolean,
    /// Untyped placeholder for values with no known mapping.
    Any,
    Void,
    Null,
    /// A declared or type-parameter name.
    Named(String),
    /// A generic instantiation such as `Promise<T>`.
    Generic { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    Union(Vec<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array(inner: TypeRef) -> Self {
        TypeRef::Array(Box::new(inner))
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Generic {
            name: name.into(),
            args,
        }
    }

    pub fn promise(inner: TypeRef) -> Self {
        TypeRef::generic("Promise", vec![inner])
    }

    pub fn partial(inner: TypeRef) -> Self {
        TypeRef::generic("Partial", vec![inner])
    }
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An interface member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Property {
        name: String,
        ty: TypeRef,
        optional: bool,
    },
    Method {
        name: String,
        type_params: Vec<String>,
        params: Vec<Param>,
        returns: TypeRef,
    },
}

/// A value expression. Generated code only binds to the data service, so
/// the expression language stays small.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Str(String),
    Ident(String),
    /// `callee<type_args>(args)`; `callee` may be a dotted path.
    Call {
        callee: String,
        type_args: Vec<TypeRef>,
        args: Vec<Expr>,
    },
    Object(Vec<(String, Expr)>),
    Arrow {
        params: Vec<Param>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub doc: Option<String>,
    pub extends: Option<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub doc: Option<String>,
    pub params: Vec<Param>,
    pub returns: TypeRef,
    pub body: Expr,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Import {
        names: Vec<String>,
        from: String,
        type_only: bool,
    },
    Interface(Interface),
    TypeAlias {
        name: String,
        ty: TypeRef,
    },
    Const {
        name: String,
        ty: Option<TypeRef>,
        value: Expr,
    },
    Function(Function),
    ReExport {
        names: Vec<String>,
        from: String,
        type_only: bool,
    },
    ReExportAll {
        from: String,
    },
}

/// One generated source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub path: String,
    pub items: Vec<Item>,
}

impl Module {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// The directory part of the module path (empty for top-level modules).
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// Every module produced by one generation run, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    pub modules: Vec<Module>,
}

impl ArtifactSet {
    pub fn extend(&mut self, modules: impl IntoIterator<Item = Module>) {
        self.modules.extend(modules);
    }

    pub fn module(&self, path: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.path == path)
    }

    /// Renders every module to `(relative file path, contents)`.
    pub fn render(&self, emitter: &dyn Emitter) -> Vec<(PathBuf, String)> {
        self.modules
            .iter()
            .map(|module| (emitter.file_path(module), emitter.render(module)))
            .collect()
    }

    /// Renders and writes every module below `out_dir`.
    ///
    /// Files are written one at a time. A failure stops the run and leaves
    /// the files written so far in place.
    pub fn write(&self, out_dir: &Path, emitter: &dyn Emitter) -> Result<usize, PipelineError> {
        let mut written = 0;

        for (relative, content) in self.render(emitter) {
            let path = out_dir.join(&relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::io(parent, e.to_string()))?;
            }
            std::fs::write(&path, content).map_err(|e| PipelineError::io(&path, e.to_string()))?;
            debug!(path = %path.display(), "wrote artifact");
            written += 1;
        }

        info!(files = written, out_dir = %out_dir.display(), "artifacts written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emit::TypeScriptEmitter;
    use tempfile::TempDir;

    #[test]
    fn test_module_dir() {
        assert_eq!(Module::new("clients/users").dir(), "clients");
        assert_eq!(Module::new("types").dir(), "");
    }

    #[test]
    fn test_write_creates_directories() {
        let mut set = ArtifactSet::default();
        let mut module = Module::new("clients/users");
        module.push(Item::TypeAlias {
            name: "Id".to_string(),
            ty: TypeRef::String,
        });
        set.extend([module, Module::new("types")]);

        let dir = TempDir::new().unwrap();
        let written = set.write(dir.path(), &TypeScriptEmitter).unwrap();

        assert_eq!(written, 2);
        let users = std::fs::read_to_string(dir.path().join("clients/users.ts")).unwrap();
        assert!(users.contains("export type Id = string;"));
        assert!(dir.path().join("types.ts").exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("clients");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut set = ArtifactSet::default();
        set.extend([Module::new("types"), Module::new("clients/users")]);

        let result = set.write(dir.path(), &TypeScriptEmitter);
        assert!(matches!(result, Err(PipelineError::Io { .. })));
        assert!(dir.path().join("types.ts").exists());
    }
}
