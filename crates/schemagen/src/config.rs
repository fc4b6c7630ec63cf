//! Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostic::PipelineError;
use crate::edit_set::MergePolicy;
use crate::relations::DeclaredRelation;

/// Configuration for the schemagen pipeline.
///
/// Every key is optional in a config file; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw schema file, or a directory of `*.json` schema files.
    pub schema_path: PathBuf,

    /// The persisted Edit Set.
    pub edit_set_path: PathBuf,

    /// Append-only change log of transformer runs.
    pub changelog_path: PathBuf,

    /// Directory to write generated artifacts to.
    pub out_dir: PathBuf,

    /// Target language (default: "typescript").
    pub language: String,

    /// How the transformer treats the previous Edit Set.
    pub merge_policy: MergePolicy,

    /// Relations that take precedence over inferred ones.
    pub declared_relations: Vec<DeclaredRelation>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("schema.json"),
            edit_set_path: PathBuf::from("schema-edits.json"),
            changelog_path: PathBuf::from("schema-changelog.json"),
            out_dir: PathBuf::from("src/generated"),
            language: "typescript".to_string(),
            merge_policy: MergePolicy::default(),
            declared_relations: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON config file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| PipelineError::json(path, format!("Failed to parse config: {}", e)))
    }

    /// Rebases every relative path onto `root`.
    pub fn with_root(mut self, root: &Path) -> Self {
        for path in [
            &mut self.schema_path,
            &mut self.edit_set_path,
            &mut self.changelog_path,
            &mut self.out_dir,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schemagen.json");
        std::fs::write(
            &path,
            r#"{
                "out_dir": "web/src/generated",
                "merge_policy": "overwrite",
                "declared_relations": [{
                    "table": "children",
                    "name": "guardian",
                    "relation": { "type": "belongs_to", "foreign_table": "parents", "foreign_key": "guardian_id" }
                }]
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("web/src/generated"));
        assert_eq!(config.merge_policy, MergePolicy::Overwrite);
        assert_eq!(config.language, "typescript");
        assert_eq!(config.edit_set_path, PathBuf::from("schema-edits.json"));
        assert_eq!(config.declared_relations[0].relation.local_key, "id");
    }

    #[test]
    fn test_with_root_keeps_absolute_paths() {
        let mut config = PipelineConfig::default();
        config.out_dir = PathBuf::from("/abs/generated");
        let config = config.with_root(Path::new("/project"));
        assert_eq!(config.schema_path, PathBuf::from("/project/schema.json"));
        assert_eq!(config.out_dir, PathBuf::from("/abs/generated"));
    }
}
