//! Target-language emitters for the artifact model.

mod typescript;

pub use typescript::TypeScriptEmitter;

use std::path::PathBuf;

use super::Module;
use crate::diagnostic::PipelineError;

/// Renders artifact modules as source text in one language.
pub trait Emitter {
    /// Returns the language name (e.g., "typescript").
    fn language(&self) -> &str;

    /// File extension without the dot.
    fn extension(&self) -> &str;

    /// Renders one module. Output must depend only on the module.
    fn render(&self, module: &Module) -> String;

    /// Output path of `module` relative to the artifact root.
    fn file_path(&self, module: &Module) -> PathBuf {
        PathBuf::from(format!("{}.{}", module.path, self.extension()))
    }
}

/// Creates an emitter for the given language.
pub fn create_emitter(language: &str) -> Result<Box<dyn Emitter>, PipelineError> {
    match language {
        "typescript" | "ts" => Ok(Box::new(TypeScriptEmitter)),
        _ => Err(PipelineError::UnsupportedLanguage {
            language: language.to_string(),
        }),
    }
}
