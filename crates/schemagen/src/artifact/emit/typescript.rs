//! TypeScript rendering.

use std::path::{Component, Path};

use super::Emitter;
use crate::artifact::{Expr, Function, Interface, Item, Member, Module, Param, TypeRef};

const HEADER: &str = "// Generated by schemagen. Do not edit by hand.";
const INDENT: &str = "  ";

/// Renders modules as ES module TypeScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptEmitter;

impl Emitter for TypeScriptEmitter {
    fn language(&self) -> &str {
        "typescript"
    }

    fn extension(&self) -> &str {
        "ts"
    }

    fn render(&self, module: &Module) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');

        let mut previous_was_line = false;
        for item in &module.items {
            let single_line = matches!(
                item,
                Item::Import { .. } | Item::ReExport { .. } | Item::ReExportAll { .. }
            );
            // Runs of imports/re-exports stay together; everything else is
            // separated by a blank line.
            if !(single_line && previous_was_line) {
                out.push('\n');
            }
            out.push_str(&render_item(module, item));
            out.push('\n');
            previous_was_line = single_line;
        }

        out
    }
}

fn render_item(module: &Module, item: &Item) -> String {
    match item {
        Item::Import {
            names,
            from,
            type_only,
        } => format!(
            "import {}{{ {} }} from '{}';",
            if *type_only { "type " } else { "" },
            names.join(", "),
            import_specifier(module.dir(), from)
        ),
        Item::ReExport {
            names,
            from,
            type_only,
        } => format!(
            "export {}{{ {} }} from '{}';",
            if *type_only { "type " } else { "" },
            names.join(", "),
            import_specifier(module.dir(), from)
        ),
        Item::ReExportAll { from } => {
            format!("export * from '{}';", import_specifier(module.dir(), from))
        }
        Item::Interface(interface) => render_interface(interface),
        Item::TypeAlias { name, ty } => format!("export type {} = {};", name, render_type(ty)),
        Item::Const { name, ty, value } => match ty {
            Some(ty) => format!(
                "export const {}: {} = {};",
                name,
                render_type(ty),
                render_expr(value, 0)
            ),
            None => format!("export const {} = {};", name, render_expr(value, 0)),
        },
        Item::Function(function) => render_function(function),
    }
}

fn render_doc(doc: &Option<String>, out: &mut String) {
    if let Some(doc) = doc {
        out.push_str(&format!("/** {} */\n", doc));
    }
}

fn render_interface(interface: &Interface) -> String {
    let mut out = String::new();
    render_doc(&interface.doc, &mut out);

    if interface.members.is_empty() && interface.extends.is_none() {
        out.push_str(&format!("export type {} = Record<string, never>;", interface.name));
        return out;
    }

    match &interface.extends {
        Some(base) => out.push_str(&format!("export interface {} extends {} {{\n", interface.name, base)),
        None => out.push_str(&format!("export interface {} {{\n", interface.name)),
    }

    for member in &interface.members {
        out.push_str(INDENT);
        match member {
            Member::Property { name, ty, optional } => {
                let marker = if *optional { "?" } else { "" };
                out.push_str(&format!("{}{}: {};\n", property_name(name), marker, render_type(ty)));
            }
            Member::Method {
                name,
                type_params,
                params,
                returns,
            } => {
                let generics = if type_params.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", type_params.join(", "))
                };
                out.push_str(&format!(
                    "{}{}({}): {};\n",
                    property_name(name),
                    generics,
                    render_params(params),
                    render_type(returns)
                ));
            }
        }
    }

    out.push('}');
    out
}

fn render_function(function: &Function) -> String {
    let mut out = String::new();
    render_doc(&function.doc, &mut out);
    out.push_str(&format!(
        "export function {}({}): {} {{\n{}return {};\n}}",
        function.name,
        render_params(&function.params),
        render_type(&function.returns),
        INDENT,
        render_expr(&function.body, 1)
    ));
    out
}

fn render_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name, render_type(&p.ty)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Converts a TypeRef to a TypeScript type string.
pub fn render_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "string".to_string(),
        TypeRef::Number => "number".to_string(),
        TypeRef::Boolean => "boolean".to_string(),
        TypeRef::Any => "any".to_string(),
        TypeRef::Void => "void".to_string(),
        TypeRef::Null => "null".to_string(),
        TypeRef::Named(name) => name.clone(),
        TypeRef::Generic { name, args } => format!(
            "{}<{}>",
            name,
            args.iter().map(render_type).collect::<Vec<_>>().join(", ")
        ),
        TypeRef::Array(inner) => match inner.as_ref() {
            TypeRef::Union(_) => format!("({})[]", render_type(inner)),
            _ => format!("{}[]", render_type(inner)),
        },
        TypeRef::Union(members) => members.iter().map(render_type).collect::<Vec<_>>().join(" | "),
    }
}

fn render_expr(expr: &Expr, depth: usize) -> String {
    match expr {
        Expr::Str(value) => quote(value),
        Expr::Ident(name) => name.clone(),
        Expr::Call {
            callee,
            type_args,
            args,
        } => {
            let generics = if type_args.is_empty() {
                String::new()
            } else {
                format!(
                    "<{}>",
                    type_args.iter().map(render_type).collect::<Vec<_>>().join(", ")
                )
            };
            let args: Vec<String> = args.iter().map(|a| render_expr(a, depth)).collect();
            format!("{}{}({})", callee, generics, args.join(", "))
        }
        Expr::Object(entries) => {
            if entries.is_empty() {
                return "{}".to_string();
            }
            let inner = INDENT.repeat(depth + 1);
            let mut out = String::from("{\n");
            for (key, value) in entries {
                out.push_str(&format!(
                    "{}{}: {},\n",
                    inner,
                    property_name(key),
                    render_expr(value, depth + 1)
                ));
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
            out
        }
        Expr::Arrow { params, body } => {
            format!("({}) => {}", render_params(params), render_expr(body, depth))
        }
    }
}

/// Single-quoted string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Property keys that aren't identifiers get quoted.
fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Relative ES import specifier from directory `from_dir` to module `target`.
fn import_specifier(from_dir: &str, target: &str) -> String {
    let relative = pathdiff::diff_paths(Path::new(target), Path::new(from_dir))
        .unwrap_or_else(|| Path::new(target).to_path_buf());

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::ParentDir => Some("..".to_string()),
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}
