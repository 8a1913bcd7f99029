//! SQL type to semantic type mapping.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// "(255)" or "(10, 2)"
    static ref TYPE_ARGS: Regex = Regex::new(r"\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").unwrap();
    static ref PARENTHESIZED: Regex = Regex::new(r"\([^)]*\)").unwrap();
}

/// Language-neutral column type, the one generators map to target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SemanticType {
    String,
    Text,
    Short,
    Integer,
    Long,
    Double,
    Float,
    Boolean,
    Decimal,
    Date,
    DateTime,
    Time,
    Uuid,
    Binary,
    Json,
    Enum,
    /// Unmapped SQL type; always classified permissively
    #[default]
    Unknown,
}

impl SemanticType {
    /// Map a raw SQL type ("VARCHAR(255)", "timestamp with time zone",
    /// "TINYINT(1)", ...) to its semantic type. Never fails.
    pub fn from_sql_type(sql_type: &str) -> Self {
        let lower = sql_type.trim().to_lowercase();

        if lower.ends_with("[]") {
            return SemanticType::Unknown;
        }

        // MySQL convention for booleans
        if lower.replace(' ', "").starts_with("tinyint(1)") {
            return SemanticType::Boolean;
        }

        let stripped = PARENTHESIZED.replace_all(&lower, " ");
        let base = stripped
            .split_whitespace()
            .filter(|part| !matches!(*part, "unsigned" | "signed" | "zerofill"))
            .collect::<Vec<_>>()
            .join(" ");

        let mapped = match base.as_str() {
            "varchar" | "character varying" | "nvarchar" | "varchar2" | "nvarchar2" | "char"
            | "character" | "nchar" | "bpchar" | "citext" => SemanticType::String,

            "text" | "tinytext" | "mediumtext" | "longtext" | "ntext" | "clob" => SemanticType::Text,

            "smallint" | "int2" | "smallserial" | "serial2" | "tinyint" => SemanticType::Short,
            "int" | "integer" | "int4" | "serial" | "serial4" | "mediumint" => SemanticType::Integer,
            "bigint" | "int8" | "bigserial" | "serial8" => SemanticType::Long,

            "real" | "float4" | "float" => SemanticType::Float,
            "double" | "double precision" | "float8" => SemanticType::Double,
            "decimal" | "numeric" | "money" | "number" => SemanticType::Decimal,

            "boolean" | "bool" | "bit" => SemanticType::Boolean,

            "date" => SemanticType::Date,
            "timestamp" | "timestamptz" | "timestamp with time zone"
            | "timestamp without time zone" | "datetime" | "datetime2" | "smalldatetime"
            | "datetimeoffset" => SemanticType::DateTime,
            "time" | "timetz" | "time with time zone" | "time without time zone" => {
                SemanticType::Time
            }

            "uuid" | "uniqueidentifier" => SemanticType::Uuid,

            "bytea" | "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary"
            | "image" => SemanticType::Binary,

            "json" | "jsonb" => SemanticType::Json,
            "enum" | "set" => SemanticType::Enum,

            _ => SemanticType::Unknown,
        };

        if mapped == SemanticType::Unknown && !base.is_empty() {
            warn!("unmapped SQL type '{}', classifying permissively", sql_type);
        }

        mapped
    }

    /// Character data: String or Text
    pub fn is_string(&self) -> bool {
        matches!(self, SemanticType::String | SemanticType::Text)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Short
                | SemanticType::Integer
                | SemanticType::Long
                | SemanticType::Double
                | SemanticType::Float
                | SemanticType::Decimal
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, SemanticType::Date | SemanticType::DateTime | SemanticType::Time)
    }
}

/// Numeric arguments of a SQL type: `VARCHAR(255)` → `(Some(255), None)`,
/// `NUMERIC(10, 2)` → `(Some(10), Some(2))`.
pub fn parse_sql_type_args(sql_type: &str) -> (Option<u32>, Option<u32>) {
    match TYPE_ARGS.captures(sql_type) {
        Some(caps) => {
            let first = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let second = caps.get(2).and_then(|m| m.as_str().parse().ok());
            (first, second)
        }
        None => (None, None),
    }
}
