//! Live schema introspection.
//!
//! An introspector answers two questions: which tables exist, and which
//! columns each one has. The answers are taken as an immutable snapshot for
//! the rest of the run.

use tracing::{debug, info, warn};

use super::NormalizedSchema;
use crate::diagnostic::{PipelineError, SkippedTable};
use crate::model::{RawColumn, RawTable};

/// A live source of table and column listings.
pub trait SchemaIntrospector {
    /// Returns the names of all user tables.
    fn table_names(&mut self) -> Result<Vec<String>, PipelineError>;

    /// Returns the columns of `table` in declaration order.
    fn columns(&mut self, table: &str) -> Result<Vec<RawColumn>, PipelineError>;
}

/// Takes a snapshot of every table the introspector reports.
pub fn introspect(source: &mut dyn SchemaIntrospector) -> Result<NormalizedSchema, PipelineError> {
    let mut schema = NormalizedSchema::default();

    for (index, name) in source.table_names()?.into_iter().enumerate() {
        if name.is_empty() {
            let skipped = SkippedTable {
                location: format!("[{}]", index),
                reason: "missing table name".to_string(),
            };
            warn!(location = %skipped.location, "skipping unnamed table");
            schema.skipped.push(skipped);
            continue;
        }

        let columns: Vec<RawColumn> = source
            .columns(&name)?
            .into_iter()
            .filter(|c| !c.name.is_empty())
            .collect();
        debug!(table = %name, columns = columns.len(), "introspected table");
        schema.accept(format!("[{}]", index), Ok(RawTable::new(name, columns)));
    }

    info!(tables = schema.tables.len(), "schema introspected");
    Ok(schema)
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use std::path::Path;

    use rusqlite::Connection;

    use super::SchemaIntrospector;
    use crate::diagnostic::PipelineError;
    use crate::model::{ColumnDef, RawColumn};

    /// Introspects a SQLite database through `sqlite_master` and
    /// `pragma_table_info`.
    pub struct SqliteIntrospector {
        conn: Connection,
    }

    impl SqliteIntrospector {
        /// Opens the database file at `path`.
        pub fn open(path: &Path) -> Result<Self, PipelineError> {
            let conn = Connection::open(path).map_err(introspection_error)?;
            Ok(Self { conn })
        }

        /// Wraps an already open connection.
        pub fn from_connection(conn: Connection) -> Self {
            Self { conn }
        }
    }

    impl SchemaIntrospector for SqliteIntrospector {
        fn table_names(&mut self) -> Result<Vec<String>, PipelineError> {
            let mut stmt = self
                .conn
                .prepare(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                     ORDER BY name",
                )
                .map_err(introspection_error)?;

            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(introspection_error)?;

            rows.collect::<Result<Vec<_>, _>>().map_err(introspection_error)
        }

        fn columns(&mut self, table: &str) -> Result<Vec<RawColumn>, PipelineError> {
            let mut stmt = self
                .conn
                .prepare(r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?1) ORDER BY cid"#)
                .map_err(introspection_error)?;

            let rows = stmt
                .query_map([table], |row| {
                    let name: String = row.get(0)?;
                    let data_type: String = row.get(1)?;
                    let not_null: i64 = row.get(2)?;
                    let pk: i64 = row.get(3)?;
                    Ok(ColumnDef::new(name, data_type, not_null == 0 && pk == 0))
                })
                .map_err(introspection_error)?;

            rows.collect::<Result<Vec<_>, _>>().map_err(introspection_error)
        }
    }

    fn introspection_error(e: rusqlite::Error) -> PipelineError {
        PipelineError::Introspection {
            message: e.to_string(),
        }
    }
}

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteIntrospector;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnDef;

    struct FixedIntrospector {
        tables: Vec<(String, Vec<RawColumn>)>,
    }

    impl SchemaIntrospector for FixedIntrospector {
        fn table_names(&mut self) -> Result<Vec<String>, PipelineError> {
            Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
        }

        fn columns(&mut self, table: &str) -> Result<Vec<RawColumn>, PipelineError> {
            self.tables
                .iter()
                .find(|(name, _)| name == table)
                .map(|(_, cols)| cols.clone())
                .ok_or_else(|| PipelineError::Introspection {
                    message: format!("no such table: {}", table),
                })
        }
    }

    #[test]
    fn test_introspect_builds_tables() {
        let mut source = FixedIntrospector {
            tables: vec![
                ("users".to_string(), vec![ColumnDef::new("id", "uuid", false)]),
                (String::new(), vec![]),
                ("posts".to_string(), vec![ColumnDef::new("", "text", true)]),
            ],
        };

        let schema = introspect(&mut source).unwrap();
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "posts"]);
        assert!(schema.tables[1].columns.is_empty());
        assert_eq!(schema.skipped.len(), 1);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_introspection() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE classes (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE children (id INTEGER PRIMARY KEY, name TEXT, class_id INTEGER);",
        )
        .unwrap();

        let mut source = SqliteIntrospector::from_connection(conn);
        let schema = introspect(&mut source).unwrap();

        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["children", "classes"]);

        let children = &schema.tables[0];
        let cols: Vec<&str> = children.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(cols, vec!["id", "name", "class_id"]);
        assert!(!children.columns[0].is_nullable());
        assert!(children.columns[1].is_nullable());
        assert_eq!(children.columns[2].data_type, "INTEGER");
    }
}
