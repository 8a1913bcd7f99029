use serde::{Deserialize, Serialize};

use super::{SchemaModel, TableRelationships};
use crate::ast::{SemanticType, Table};
use crate::classifier::{self, ColumnRole, ValidationHint};

/// Read-only snapshot of a model, shaped for template generators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelView {
    pub entities: Vec<EntityView>,
    pub junction_tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub table_name: String,
    pub entity_name: String,
    pub module_name: String,
    pub variable_name: String,
    pub plural_variable_name: String,
    pub primary_key_columns: Vec<String>,
    pub composite_key: bool,
    pub extends_audit_base: bool,
    pub business_columns: Vec<String>,
    pub columns: Vec<ColumnView>,
    pub relationships: TableRelationships,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnView {
    pub name: String,
    pub field_name: String,
    pub sql_type: String,
    pub semantic_type: SemanticType,
    pub nullable: bool,
    pub role: ColumnRole,
    pub validation: Vec<ValidationHint>,
}

impl ModelView {
    pub fn from_model(model: &SchemaModel) -> Self {
        let entities = model
            .all_tables()
            .into_iter()
            .map(|table| EntityView::new(table, model))
            .collect();

        let junction_tables = model
            .junction_tables()
            .into_iter()
            .map(|t| t.name.clone())
            .collect();

        ModelView {
            entities,
            junction_tables,
        }
    }

    pub fn entity(&self, table_name: &str) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.table_name == table_name)
    }
}

impl EntityView {
    fn new(table: &Table, model: &SchemaModel) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|c| ColumnView {
                name: c.name.clone(),
                field_name: c.field_name(),
                sql_type: c.sql_type.clone(),
                semantic_type: c.semantic_type,
                nullable: c.nullable,
                role: classifier::column_role(table, c),
                validation: classifier::table_validation_hints(table, c),
            })
            .collect();

        EntityView {
            table_name: table.name.clone(),
            entity_name: table.entity_name(),
            module_name: table.module_name(),
            variable_name: table.variable_name(),
            plural_variable_name: table.plural_variable_name(),
            primary_key_columns: table.primary_key_columns.clone(),
            composite_key: table.has_composite_primary_key(),
            extends_audit_base: table.extends_audit_base(),
            business_columns: table
                .business_columns()
                .into_iter()
                .map(|c| c.name.clone())
                .collect(),
            columns,
            relationships: model
                .relationships_for_table(&table.name)
                .cloned()
                .unwrap_or_default(),
        }
    }
}
