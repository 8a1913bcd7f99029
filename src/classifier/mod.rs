//! Column classification for templating.
//!
//! Partitions a table's columns into primary-key, foreign-key, audit and
//! business columns, and derives validation hints. Nothing here fails: an
//! unmapped type simply gets the most permissive treatment.

use std::collections::HashSet;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::ast::{Column, SemanticType, Table};

lazy_static! {
    /// Columns handled by the shared base entity, never rendered as business fields
    pub static ref AUDIT_COLUMNS: HashSet<&'static str> = [
        "id",
        "activo",
        "created_at",
        "updated_at",
        "created_by",
        "updated_by",
        "deleted_at",
        "deleted_by",
    ]
    .into_iter()
    .collect();

    /// Presence of any of these marks a table as extending the audit base.
    /// Kept apart from AUDIT_COLUMNS on purpose: the two sets differ.
    pub static ref AUDIT_BASE_MARKERS: HashSet<&'static str> =
        ["estado", "created_at"].into_iter().collect();
}

/// Role of a column in generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    PrimaryKey,
    ForeignKey,
    Audit,
    Business,
}

/// Constraint descriptors for generated validation annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationHint {
    NotBlank,
    NotNull,
    MaxLength(u32),
    Digits { integer: u32, fraction: u32 },
    Unique,
}

/// A table's columns split by role, declared order kept within each bucket
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedColumns<'a> {
    pub primary_key: Vec<&'a Column>,
    pub foreign_key: Vec<&'a Column>,
    pub audit: Vec<&'a Column>,
    pub business: Vec<&'a Column>,
}

pub fn is_audit_column(name: &str) -> bool {
    AUDIT_COLUMNS.contains(name.to_lowercase().as_str())
}

/// Role of one column. Precedence: primary key, foreign key, audit, business.
pub fn column_role(table: &Table, column: &Column) -> ColumnRole {
    if table.is_primary_key_column(&column.name) {
        ColumnRole::PrimaryKey
    } else if table.is_foreign_key_column(&column.name) {
        ColumnRole::ForeignKey
    } else if is_audit_column(&column.name) {
        ColumnRole::Audit
    } else {
        ColumnRole::Business
    }
}

pub fn classify(table: &Table) -> ClassifiedColumns<'_> {
    let mut classified = ClassifiedColumns {
        primary_key: Vec::new(),
        foreign_key: Vec::new(),
        audit: Vec::new(),
        business: Vec::new(),
    };

    for column in &table.columns {
        let bucket = match column_role(table, column) {
            ColumnRole::PrimaryKey => &mut classified.primary_key,
            ColumnRole::ForeignKey => &mut classified.foreign_key,
            ColumnRole::Audit => &mut classified.audit,
            ColumnRole::Business => &mut classified.business,
        };
        bucket.push(column);
    }

    classified
}

/// Columns rendered as plain fields: not primary key, not foreign key,
/// not an audit column
pub fn business_columns(table: &Table) -> Vec<&Column> {
    table
        .columns
        .iter()
        .filter(|c| column_role(table, c) == ColumnRole::Business)
        .collect()
}

/// True when any column is an audit-base marker ("estado", "created_at")
pub fn extends_audit_base(table: &Table) -> bool {
    table
        .columns
        .iter()
        .any(|c| AUDIT_BASE_MARKERS.contains(c.name.to_lowercase().as_str()))
}

/// Hints from the column's own facts. Uniqueness is read from the column
/// flag only; use [`table_validation_hints`] to include table-level unique
/// constraints and indexes.
pub fn validation_hints(column: &Column) -> Vec<ValidationHint> {
    hints_for(column, column.primary_key, column.unique)
}

/// Hints for a column in the context of its table
pub fn table_validation_hints(table: &Table, column: &Column) -> Vec<ValidationHint> {
    hints_for(
        column,
        table.is_primary_key_column(&column.name),
        table.is_column_unique(&column.name),
    )
}

fn hints_for(column: &Column, primary_key: bool, unique: bool) -> Vec<ValidationHint> {
    let mut hints = Vec::new();

    // System-assigned
    if primary_key {
        return hints;
    }

    match column.semantic_type {
        SemanticType::Unknown => {}
        t if t.is_string() => {
            if !column.nullable {
                hints.push(ValidationHint::NotBlank);
            }
            if let Some(length) = column.length {
                hints.push(ValidationHint::MaxLength(length));
            }
        }
        t => {
            if !column.nullable {
                hints.push(ValidationHint::NotNull);
            }
            if t == SemanticType::Decimal {
                if let Some(precision) = column.precision {
                    let fraction = column.scale.unwrap_or(0).min(precision);
                    hints.push(ValidationHint::Digits {
                        integer: precision - fraction,
                        fraction,
                    });
                }
            }
        }
    }

    if unique {
        hints.push(ValidationHint::Unique);
    }

    hints
}
