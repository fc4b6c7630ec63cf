//! # schemagen
//!
//! Turns a raw table/column schema into an editable Edit Set, infers the
//! relations between tables, and generates typed data-access modules for a
//! tabular backend.
//!
//! ## Supported Languages
//!
//! - TypeScript (default)
//!
//! ## Architecture
//!
//! ```text
//! Raw schema (JSON / SQLite)
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Loader    │  Normalize payload shapes
//! │ (JSON → Raw) │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Transformer │  Wrap in pending edits, merge with
//! │ (Raw → Edit) │  the previous Edit Set
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Inferencer  │  belongs_to / has_many / many_to_many
//! │ (Edit → Edit)│
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Artifact modules, rendered by
//! │ (Edit → TS)  │  a language emitter
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemagen::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     schema_path: "schema.json".into(),
//!     out_dir: "src/generated".into(),
//!     ..PipelineConfig::default()
//! };
//!
//! let summary = Pipeline::new(config).run()?;
//! ```

pub mod artifact;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod edit_set;
pub mod loader;
pub mod model;
pub mod relations;

use tracing::{debug, info};

pub use config::PipelineConfig;
pub use diagnostic::{PipelineError, SkippedTable};
pub use edit_set::MergePolicy;
pub use loader::NormalizedSchema;
pub use model::EditSet;
pub use relations::{InferenceReport, Inferencer};

/// The main pipeline struct that orchestrates loading, transformation,
/// inference and generation.
///
/// Every stage reads and writes the Edit Set at `edit_set_path`, so stages
/// can be run one at a time with a manual review in between.
pub struct Pipeline {
    config: PipelineConfig,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tables in the Edit Set.
    pub tables: usize,
    /// Raw tables the loader rejected.
    pub skipped: usize,
    /// Active relations across all tables.
    pub relations: usize,
    /// Artifact files written.
    pub files_written: usize,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads the raw schema from `schema_path`.
    pub fn load(&self) -> Result<NormalizedSchema, PipelineError> {
        loader::load_path(&self.config.schema_path)
    }

    /// Builds the Edit Set from `schema`, merging with the stored one.
    ///
    /// Saves the Edit Set and appends one entry to the change log.
    pub fn transform(&self, schema: &NormalizedSchema) -> Result<EditSet, PipelineError> {
        let previous = EditSet::load(&self.config.edit_set_path)?;
        let transformation =
            edit_set::transform(&schema.tables, previous.as_ref(), self.config.merge_policy);

        transformation.edit_set.save(&self.config.edit_set_path)?;
        edit_set::ChangeLog::append(&self.config.changelog_path, transformation.entry)?;
        debug!(path = %self.config.edit_set_path.display(), "edit set saved");

        Ok(transformation.edit_set)
    }

    /// Infers relations into the stored Edit Set and saves it.
    pub fn infer(&self) -> Result<InferenceReport, PipelineError> {
        let mut edit_set = self.stored_edit_set()?;
        let report = self.infer_into(&mut edit_set)?;
        edit_set.save(&self.config.edit_set_path)?;
        Ok(report)
    }

    /// Generates artifacts from the stored Edit Set.
    ///
    /// Returns the number of files written.
    pub fn generate(&self) -> Result<usize, PipelineError> {
        let emitter = artifact::emit::create_emitter(&self.config.language)?;
        let edit_set = self.stored_edit_set()?;
        codegen::generate(&edit_set).write(&self.config.out_dir, emitter.as_ref())
    }

    /// Runs every stage, reading the raw schema from `schema_path`.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        // Fail on the language before anything is written
        artifact::emit::create_emitter(&self.config.language)?;
        let schema = self.load()?;
        self.run_with(schema)
    }

    /// Runs transformation, inference and generation over `schema`.
    pub fn run_with(&self, schema: NormalizedSchema) -> Result<RunSummary, PipelineError> {
        let emitter = artifact::emit::create_emitter(&self.config.language)?;

        let mut edit_set = self.transform(&schema)?;
        self.infer_into(&mut edit_set)?;
        edit_set.save(&self.config.edit_set_path)?;

        let files_written = codegen::generate(&edit_set).write(&self.config.out_dir, emitter.as_ref())?;

        let summary = RunSummary {
            tables: edit_set.tables.len(),
            skipped: schema.skipped.len(),
            relations: edit_set.relation_count(),
            files_written,
        };
        info!(
            tables = summary.tables,
            skipped = summary.skipped,
            relations = summary.relations,
            files = summary.files_written,
            "pipeline finished"
        );
        Ok(summary)
    }

    fn infer_into(&self, edit_set: &mut EditSet) -> Result<InferenceReport, PipelineError> {
        let inferencer = Inferencer::with_declarations(self.config.declared_relations.clone());
        inferencer.infer(edit_set)
    }

    fn stored_edit_set(&self) -> Result<EditSet, PipelineError> {
        EditSet::load(&self.config.edit_set_path)?.ok_or_else(|| PipelineError::MissingEditSet {
            path: self.config.edit_set_path.clone(),
        })
    }
}
