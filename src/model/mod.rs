pub mod view;

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::ast::{SchemaFacts, Table};
use crate::error::ModelError;
use crate::relation::{RelationType, Resolver, TableRelationship};

pub use view::{ColumnView, EntityView, ModelView};

/// The per-table relationship view generators consume
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRelationships {
    /// Edges owned by the table (its own foreign keys)
    pub outgoing: Vec<TableRelationship>,
    /// Edges from other entity tables referencing this one
    pub incoming: Vec<TableRelationship>,
    /// Synthesized edges this table is an endpoint of
    pub many_to_many: Vec<TableRelationship>,
}

impl TableRelationships {
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty() && self.many_to_many.is_empty()
    }
}

/// Fully resolved, immutable schema graph.
///
/// Built once from the parser's facts; every query is a read of data
/// computed at build time, so a model can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    tables: Vec<Table>,
    index: HashMap<String, usize>,
    junctions: HashSet<String>,
    relationships: Vec<TableRelationship>,
    per_table: HashMap<String, TableRelationships>,
}

impl SchemaModel {
    /// Validate and resolve a set of tables. Fails on the first
    /// inconsistency; no partial model is returned.
    pub fn build(mut tables: Vec<Table>) -> Result<Self, ModelError> {
        for table in &mut tables {
            table.normalize();
        }

        let index = validate(&tables)?;

        let resolver = Resolver::new(&tables);
        let relationships = resolver.resolve()?;

        let junctions: HashSet<String> = resolver
            .junction_tables()
            .iter()
            .map(|t| t.name.clone())
            .collect();

        let mut per_table = HashMap::with_capacity(tables.len());
        for table in &tables {
            let relationships = TableRelationships {
                outgoing: relationships
                    .iter()
                    .filter(|e| e.junction.is_none() && e.source_table == table.name)
                    .cloned()
                    .collect(),
                incoming: resolver.find_inverse_relationships(table),
                many_to_many: relationships
                    .iter()
                    .filter(|e| e.junction.is_some() && e.involves(&table.name))
                    .cloned()
                    .collect(),
            };
            debug!(
                "{}: {} outgoing, {} incoming, {} many-to-many",
                table.name,
                relationships.outgoing.len(),
                relationships.incoming.len(),
                relationships.many_to_many.len()
            );
            per_table.insert(table.name.clone(), relationships);
        }

        info!(
            "schema model built: {} tables, {} junctions, {} relationships",
            tables.len(),
            junctions.len(),
            relationships.len()
        );

        Ok(SchemaModel {
            tables,
            index,
            junctions,
            relationships,
            per_table,
        })
    }

    /// Attach schema-level foreign keys and indexes to their tables, then build
    pub fn from_facts(facts: SchemaFacts) -> Result<Self, ModelError> {
        let SchemaFacts {
            mut tables,
            foreign_keys,
            indexes,
        } = facts;

        for entry in foreign_keys {
            let table = tables
                .iter_mut()
                .find(|t| t.name == entry.table)
                .ok_or_else(|| ModelError::UnknownTable {
                    table: entry.table.clone(),
                })?;
            table.add_foreign_key(entry.foreign_key);
        }

        for index in indexes {
            let table = tables
                .iter_mut()
                .find(|t| t.name == index.table_name)
                .ok_or_else(|| ModelError::UnknownTable {
                    table: index.table_name.clone(),
                })?;
            table.add_index(index);
        }

        Self::build(tables)
    }

    /// Entity tables, the ones code is generated for. Junction tables are
    /// kept internally but left out here.
    pub fn all_tables(&self) -> Vec<&Table> {
        self.tables
            .iter()
            .filter(|t| !self.junctions.contains(&t.name))
            .collect()
    }

    pub fn junction_tables(&self) -> Vec<&Table> {
        self.tables
            .iter()
            .filter(|t| self.junctions.contains(&t.name))
            .collect()
    }

    /// Any table, junctions included
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&i| &self.tables[i])
    }

    pub fn is_junction(&self, name: &str) -> bool {
        self.junctions.contains(name)
    }

    /// Direct edges followed by synthesized many-to-many edges
    pub fn all_relationships(&self) -> &[TableRelationship] {
        &self.relationships
    }

    pub fn relationships_for_table(&self, name: &str) -> Option<&TableRelationships> {
        self.per_table.get(name)
    }

    /// Relationships of one kind, in resolution order
    pub fn relationships_of_type(&self, relation_type: RelationType) -> Vec<&TableRelationship> {
        self.relationships
            .iter()
            .filter(|r| r.relation_type == relation_type)
            .collect()
    }

    /// Serializable snapshot of everything a generator reads
    pub fn view(&self) -> ModelView {
        ModelView::from_model(self)
    }
}

/// Structural checks, in order per table: duplicate table, duplicate column,
/// primary key columns declared, foreign key columns declared, foreign key
/// targets present.
fn validate(tables: &[Table]) -> Result<HashMap<String, usize>, ModelError> {
    let mut index = HashMap::with_capacity(tables.len());

    for (i, table) in tables.iter().enumerate() {
        if index.insert(table.name.clone(), i).is_some() {
            return Err(ModelError::DuplicateTable {
                table: table.name.clone(),
            });
        }
    }

    for table in tables {
        let mut seen = HashSet::with_capacity(table.columns.len());
        for column in &table.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        if table.primary_key_columns.is_empty() {
            warn!("table '{}' has no primary key", table.name);
        }
        for pk in &table.primary_key_columns {
            if !seen.contains(pk.as_str()) {
                return Err(ModelError::UnknownPrimaryKeyColumn {
                    table: table.name.clone(),
                    column: pk.clone(),
                });
            }
        }

        for fk in &table.foreign_keys {
            if !seen.contains(fk.column_name.as_str()) {
                return Err(ModelError::UnknownColumn {
                    table: table.name.clone(),
                    column: fk.column_name.clone(),
                });
            }
            if !index.contains_key(&fk.referenced_table) {
                return Err(ModelError::UnresolvedReference {
                    table: table.name.clone(),
                    column: fk.column_name.clone(),
                    referenced_table: fk.referenced_table.clone(),
                });
            }
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Column, ForeignKey, Index, TableForeignKey};
    use pretty_assertions::assert_eq;

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", "BIGINT").primary_key())
            .column(Column::new("email", "VARCHAR(255)").not_null().unique())
    }

    fn roles() -> Table {
        Table::new("roles")
            .column(Column::new("id", "BIGINT").primary_key())
            .column(Column::new("name", "VARCHAR(50)").not_null())
    }

    fn user_roles() -> Table {
        Table::new("user_roles")
            .column(Column::new("user_id", "BIGINT"))
            .column(Column::new("role_id", "BIGINT"))
            .foreign_key(ForeignKey::new("user_id", "users"))
            .foreign_key(ForeignKey::new("role_id", "roles"))
            .primary_key(&["user_id", "role_id"])
    }

    #[test]
    fn test_build_users_roles() {
        let model = SchemaModel::build(vec![users(), roles(), user_roles()]).unwrap();

        let entities: Vec<&str> = model.all_tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(entities, vec!["users", "roles"]);
        assert!(model.is_junction("user_roles"));
        assert!(model.table("user_roles").is_some());

        assert_eq!(model.all_relationships().len(), 1);
        assert_eq!(model.relationships_of_type(RelationType::ManyToMany).len(), 1);
    }

    #[test]
    fn test_duplicate_table() {
        let err = SchemaModel::build(vec![users(), users()]).unwrap_err();
        assert_eq!(err, ModelError::DuplicateTable { table: "users".to_string() });
    }

    #[test]
    fn test_duplicate_column() {
        let table = users().column(Column::new("email", "TEXT"));
        let err = SchemaModel::build(vec![table]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateColumn {
                table: "users".to_string(),
                column: "email".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_fk_column() {
        let orders = Table::new("orders")
            .column(Column::new("id", "BIGINT").primary_key())
            .foreign_key(ForeignKey::new("user_id", "users"));

        let err = SchemaModel::build(vec![users(), orders]).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownColumn {
                table: "orders".to_string(),
                column: "user_id".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_pk_column() {
        let table = roles().primary_key(&["code"]);
        let err = SchemaModel::build(vec![table]).unwrap_err();
        assert!(matches!(err, ModelError::UnknownPrimaryKeyColumn { .. }));
    }

    #[test]
    fn test_unresolved_reference_fails_build() {
        let err = SchemaModel::build(vec![roles(), user_roles()]).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnresolvedReference {
                table: "user_roles".to_string(),
                column: "user_id".to_string(),
                referenced_table: "users".to_string(),
            }
        );
    }

    #[test]
    fn test_table_without_primary_key_builds() {
        let log = Table::new("audit_log").column(Column::new("message", "TEXT"));
        let model = SchemaModel::build(vec![log]).unwrap();

        assert_eq!(model.all_tables().len(), 1);
        assert!(model.junction_tables().is_empty());
        assert!(model.relationships_for_table("audit_log").unwrap().is_empty());
    }

    #[test]
    fn test_from_facts_merges_schema_level_entries() {
        let orders = Table::new("orders")
            .column(Column::new("id", "BIGINT").primary_key())
            .column(Column::new("user_id", "BIGINT"));

        let facts = SchemaFacts {
            tables: vec![users(), orders],
            foreign_keys: vec![TableForeignKey {
                table: "orders".to_string(),
                foreign_key: ForeignKey::new("user_id", "users"),
            }],
            indexes: vec![Index::new("ux_orders_user", "orders", &["user_id"]).unique()],
        };

        let model = SchemaModel::from_facts(facts).unwrap();
        let outgoing = &model.relationships_for_table("orders").unwrap().outgoing;
        assert_eq!(outgoing.len(), 1);
        // unique index on the FK column
        assert_eq!(outgoing[0].relation_type, RelationType::OneToOne);

        let incoming = &model.relationships_for_table("users").unwrap().incoming;
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].relation_type, RelationType::OneToMany);
        assert!(incoming[0].unique_reference);
    }

    #[test]
    fn test_from_facts_unknown_table() {
        let facts = SchemaFacts {
            tables: vec![users()],
            foreign_keys: vec![TableForeignKey {
                table: "orders".to_string(),
                foreign_key: ForeignKey::new("user_id", "users"),
            }],
            indexes: vec![],
        };

        let err = SchemaModel::from_facts(facts).unwrap_err();
        assert_eq!(err, ModelError::UnknownTable { table: "orders".to_string() });
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaModel>();
    }
}
