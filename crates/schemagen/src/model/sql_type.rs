//! Classification of source SQL type names.

/// Coarse category of a source column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    Uuid,
    Text,
    Boolean,
    Integer,
    Float,
    Json,
    /// Dates, times and timestamps; carried as strings.
    Temporal,
    Array(Box<SqlType>),
    /// Anything not recognized. Degrades to an untyped placeholder.
    Unknown,
}

impl SqlType {
    /// Parses a type name such as `character varying(255)`, `int4`,
    /// `timestamp with time zone` or `text[]`. Matching is case-insensitive.
    pub fn parse(raw: &str) -> SqlType {
        let lowered = raw.trim().to_ascii_lowercase();

        if let Some(inner) = lowered.strip_suffix("[]") {
            return SqlType::Array(Box::new(SqlType::parse(inner)));
        }
        if let Some(inner) = lowered.strip_prefix('_') {
            return SqlType::Array(Box::new(SqlType::parse(inner)));
        }
        if lowered == "array" {
            return SqlType::Array(Box::new(SqlType::Unknown));
        }

        let base = strip_parameters(&lowered);
        match base.as_str() {
            "uuid" => SqlType::Uuid,
            "text" | "varchar" | "character varying" | "char" | "character" | "bpchar"
            | "string" | "citext" | "name" => SqlType::Text,
            "bool" | "boolean" => SqlType::Boolean,
            "int" | "integer" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "tinyint"
            | "mediumint" | "serial" | "smallserial" | "bigserial" => SqlType::Integer,
            "float" | "float4" | "float8" | "double" | "double precision" | "real"
            | "numeric" | "decimal" | "money" => SqlType::Float,
            "json" | "jsonb" => SqlType::Json,
            other if other.starts_with("timestamp")
                || other.starts_with("time")
                || other.starts_with("date")
                || other == "interval" =>
            {
                SqlType::Temporal
            }
            _ => SqlType::Unknown,
        }
    }

    /// Whether values of this type can hold a row identifier.
    pub fn is_identifier(&self) -> bool {
        matches!(self, SqlType::Uuid | SqlType::Text | SqlType::Integer)
    }
}

/// Removes `(...)` groups and collapses whitespace.
fn strip_parameters(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
