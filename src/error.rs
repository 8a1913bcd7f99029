use serde::Serialize;
use thiserror::Error;

/// Errors raised while assembling a [`SchemaModel`](crate::model::SchemaModel).
///
/// Every variant is fatal for the build: no partial model is ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum ModelError {
    #[error("Duplicate table: {table}")]
    DuplicateTable { table: String },

    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Unknown table '{table}' referenced by schema facts")]
    UnknownTable { table: String },

    #[error("Foreign key column '{column}' is not declared on table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Primary key column '{column}' is not declared on table '{table}'")]
    UnknownPrimaryKeyColumn { table: String, column: String },

    #[error(
        "Unresolved reference: table '{table}' column '{column}' references missing table '{referenced_table}'"
    )]
    UnresolvedReference {
        table: String,
        column: String,
        referenced_table: String,
    },
}

impl ModelError {
    /// Name of the table the error was raised for.
    pub fn table(&self) -> &str {
        match self {
            ModelError::DuplicateTable { table }
            | ModelError::DuplicateColumn { table, .. }
            | ModelError::UnknownTable { table }
            | ModelError::UnknownColumn { table, .. }
            | ModelError::UnknownPrimaryKeyColumn { table, .. }
            | ModelError::UnresolvedReference { table, .. } => table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_reference_message() {
        let err = ModelError::UnresolvedReference {
            table: "orders".to_string(),
            column: "customer_id".to_string(),
            referenced_table: "customers".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("orders"));
        assert!(msg.contains("customer_id"));
        assert!(msg.contains("customers"));
        assert_eq!(err.table(), "orders");
    }

    #[test]
    fn test_error_serializes_with_kind() {
        let err = ModelError::UnknownColumn {
            table: "orders".to_string(),
            column: "ghost_id".to_string(),
        };

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "UnknownColumn");
        assert_eq!(json["data"]["table"], "orders");
        assert_eq!(json["data"]["column"], "ghost_id");
    }
}
