//! Pipeline error types.
#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a pipeline stage.
///
/// Per-table problems are not errors: they surface as [`SkippedTable`]
/// values and the run continues with the remaining tables.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum PipelineError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Unrecognized schema format: {reason}")]
    #[diagnostic(
        code(schemagen::format::unrecognized),
        help("Expected an array of tables, an object of tables keyed by name, or an object with a 'tables' key")
    )]
    SchemaFormat {
        reason: String,
    },

    #[error("Failed to parse JSON in '{}': {message}", path.display())]
    #[diagnostic(code(schemagen::format::invalid_json))]
    Json {
        path: PathBuf,
        message: String,
    },

    #[error("Schema introspection failed: {message}")]
    #[diagnostic(code(schemagen::introspect::failed))]
    Introspection {
        message: String,
    },

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("I/O error on '{}': {message}", path.display())]
    #[diagnostic(code(schemagen::io::failed))]
    Io {
        path: PathBuf,
        message: String,
    },

    #[error("No Edit Set found at '{}'", path.display())]
    #[diagnostic(
        code(schemagen::edit_set::missing),
        help("Run the transformer first to create the Edit Set")
    )]
    MissingEditSet {
        path: PathBuf,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Unsupported target language: {language}")]
    #[diagnostic(
        code(schemagen::config::unsupported_language),
        help("Supported languages: typescript")
    )]
    UnsupportedLanguage {
        language: String,
    },

    #[error("Declared relation '{table}.{name}' is invalid: {reason}")]
    #[diagnostic(code(schemagen::relations::invalid_declaration))]
    InvalidDeclaration {
        table: String,
        name: String,
        reason: String,
    },
}

impl PipelineError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a JSON error.
    pub fn json(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Json {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A table the loader could not accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTable {
    /// Position (or key) of the entry in the raw payload.
    pub location: String,
    /// Why the entry was skipped.
    pub reason: String,
}
