//! Relationship inference over a set of tables.
//!
//! Resolution runs in two flat passes: first every table is classified
//! (junction or entity), then foreign keys and junction tables are walked
//! to emit edges. The graph is at most entity–junction–entity deep, so no
//! traversal is needed and self-referencing schemas cannot loop.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ast::{ForeignKey, Table};
use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    ManyToOne,
    OneToOne,
    /// Only on inverse edges: the referenced table's view of a foreign key
    OneToMany,
    ManyToMany,
}

impl RelationType {
    /// Whether the non-owning side holds a collection
    pub fn is_collection(self) -> bool {
        matches!(self, RelationType::OneToMany | RelationType::ManyToMany)
    }
}

/// Join-table metadata carried by a synthesized many-to-many edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionLink {
    pub table: String,
    /// Junction column referencing the edge's source table
    pub source_column: String,
    /// Junction column referencing the edge's target table
    pub target_column: String,
}

/// A directed edge between two tables of the same schema.
///
/// Direct edges point from the table holding the foreign key to the table
/// it references. Inverse edges keep the same endpoints and foreign key and
/// are always `OneToMany`; `unique_reference` marks those whose foreign key
/// column is unique. Many-to-many edges connect the two entity tables of a
/// junction, which is recorded in `junction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRelationship {
    pub source_table: String,
    pub target_table: String,
    pub foreign_key: ForeignKey,
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<JunctionLink>,
    /// The foreign key column is unique in its owning table
    #[serde(default)]
    pub unique_reference: bool,
}

impl TableRelationship {
    pub fn involves(&self, table: &str) -> bool {
        self.source_table == table || self.target_table == table
    }

    pub fn is_self_referencing(&self) -> bool {
        self.source_table == self.target_table
    }

    /// The endpoint opposite to `table`, or None when `table` is not an endpoint
    pub fn other_end(&self, table: &str) -> Option<&str> {
        if self.source_table == table {
            Some(&self.target_table)
        } else if self.target_table == table {
            Some(&self.source_table)
        } else {
            None
        }
    }
}

/// Exactly two foreign keys, a composite primary key, and the foreign key
/// columns equal to the primary key columns (as multisets).
pub fn is_junction_table(table: &Table) -> bool {
    if table.foreign_keys.len() != 2 || !table.has_composite_primary_key() {
        return false;
    }

    let mut fk_columns: Vec<&str> = table
        .foreign_keys
        .iter()
        .map(|fk| fk.column_name.as_str())
        .collect();
    let mut pk_columns = table.effective_primary_key();

    fk_columns.sort_unstable();
    pk_columns.sort_unstable();
    fk_columns == pk_columns
}

/// Cardinality of `foreign_key`, owned by `owning`, pointing at `referenced`.
///
/// 1. owned by a junction table → ManyToMany
/// 2. owning column unique      → OneToOne
/// 3. otherwise                 → ManyToOne
pub fn infer_relation_type(
    foreign_key: &ForeignKey,
    owning: &Table,
    referenced: &Table,
) -> RelationType {
    let relation_type = if is_junction_table(owning)
        && owning.is_foreign_key_column(&foreign_key.column_name)
    {
        RelationType::ManyToMany
    } else if owning.is_column_unique(&foreign_key.column_name) {
        RelationType::OneToOne
    } else {
        RelationType::ManyToOne
    };

    debug!(
        "{}.{} -> {}: {:?}",
        owning.name, foreign_key.column_name, referenced.name, relation_type
    );
    relation_type
}

/// Resolves edges over a fixed slice of tables.
pub struct Resolver<'a> {
    tables: &'a [Table],
    by_name: HashMap<&'a str, &'a Table>,
    junctions: HashSet<&'a str>,
}

impl<'a> Resolver<'a> {
    /// First pass: index tables and classify junctions
    pub fn new(tables: &'a [Table]) -> Self {
        let by_name = tables.iter().map(|t| (t.name.as_str(), t)).collect();
        let junctions = tables
            .iter()
            .filter(|t| is_junction_table(t))
            .map(|t| t.name.as_str())
            .collect();

        Resolver {
            tables,
            by_name,
            junctions,
        }
    }

    pub fn is_junction(&self, table: &str) -> bool {
        self.junctions.contains(table)
    }

    /// Junction tables in declared order
    pub fn junction_tables(&self) -> Vec<&'a Table> {
        self.tables
            .iter()
            .filter(|t| self.junctions.contains(t.name.as_str()))
            .collect()
    }

    fn referenced(&self, owning: &Table, fk: &ForeignKey) -> Result<&'a Table, ModelError> {
        self.by_name
            .get(fk.referenced_table.as_str())
            .copied()
            .ok_or_else(|| ModelError::UnresolvedReference {
                table: owning.name.clone(),
                column: fk.column_name.clone(),
                referenced_table: fk.referenced_table.clone(),
            })
    }

    /// Second pass: one edge per foreign key of every non-junction table
    pub fn direct_relationships(&self) -> Result<Vec<TableRelationship>, ModelError> {
        let mut edges = Vec::new();

        for table in self.tables {
            if self.is_junction(&table.name) {
                continue;
            }
            for fk in &table.foreign_keys {
                let target = self.referenced(table, fk)?;
                edges.push(TableRelationship {
                    source_table: table.name.clone(),
                    target_table: target.name.clone(),
                    foreign_key: fk.clone(),
                    relation_type: infer_relation_type(fk, table, target),
                    junction: None,
                    unique_reference: table.is_column_unique(&fk.column_name),
                });
            }
        }

        Ok(edges)
    }

    /// Second pass: fold each junction table into one many-to-many edge
    /// between the two tables it references
    pub fn synthesize_many_to_many(&self) -> Result<Vec<TableRelationship>, ModelError> {
        let mut edges = Vec::new();

        for junction in self.junction_tables() {
            let (first, second) = match junction.foreign_keys.as_slice() {
                [first, second] => (first, second),
                _ => continue,
            };

            let source = self.referenced(junction, first)?;
            let target = self.referenced(junction, second)?;

            debug!(
                "junction {}: {} <-> {}",
                junction.name, source.name, target.name
            );

            edges.push(TableRelationship {
                source_table: source.name.clone(),
                target_table: target.name.clone(),
                foreign_key: first.clone(),
                relation_type: RelationType::ManyToMany,
                junction: Some(JunctionLink {
                    table: junction.name.clone(),
                    source_column: first.column_name.clone(),
                    target_column: second.column_name.clone(),
                }),
                unique_reference: false,
            });
        }

        Ok(edges)
    }

    /// Foreign keys of other, non-junction tables that reference `table`,
    /// each as a `OneToMany` edge seen from `table`
    pub fn find_inverse_relationships(&self, table: &Table) -> Vec<TableRelationship> {
        let mut edges = Vec::new();

        for other in self.tables {
            if other.name == table.name || self.is_junction(&other.name) {
                continue;
            }
            for fk in other
                .foreign_keys
                .iter()
                .filter(|fk| fk.referenced_table == table.name)
            {
                edges.push(TableRelationship {
                    source_table: other.name.clone(),
                    target_table: table.name.clone(),
                    foreign_key: fk.clone(),
                    relation_type: RelationType::OneToMany,
                    junction: None,
                    unique_reference: other.is_column_unique(&fk.column_name),
                });
            }
        }

        edges
    }

    /// Direct edges followed by synthesized many-to-many edges
    pub fn resolve(&self) -> Result<Vec<TableRelationship>, ModelError> {
        let mut edges = self.direct_relationships()?;
        edges.extend(self.synthesize_many_to_many()?);
        Ok(edges)
    }
}
