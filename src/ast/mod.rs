pub mod types;

use serde::{Deserialize, Serialize};

use crate::classifier;
use crate::naming;

pub use types::{parse_sql_type_args, SemanticType};

/// A single table column as reported by the upstream SQL parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    #[serde(default)]
    pub semantic_type: SemanticType,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Action taken on the referencing rows when the referenced row changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    #[default]
    NoAction,
}

impl ReferentialAction {
    /// Parse the SQL spelling: "CASCADE", "set null", "NO ACTION", ...
    pub fn from_sql(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "SET DEFAULT" => Some(Self::SetDefault),
            "RESTRICT" => Some(Self::Restrict),
            "NO ACTION" => Some(Self::NoAction),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// Single-column foreign key owned by a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub column_name: String,
    pub referenced_table: String,
    #[serde(default = "default_referenced_column")]
    pub referenced_column: String,
    #[serde(default)]
    pub on_delete: ReferentialAction,
    #[serde(default)]
    pub on_update: ReferentialAction,
}

fn default_referenced_column() -> String {
    "id".to_string()
}

/// Index access method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexType {
    #[default]
    BTree,
    Hash,
    Gin,
    Gist,
    Brin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub table_name: String,
    /// Indexed columns, order significant
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, rename = "type")]
    pub index_type: IndexType,
    /// Partial index predicate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub primary_key_columns: Vec<String>,
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    #[serde(default)]
    pub check_constraints: Vec<CheckConstraint>,
}

/// A foreign key declared at schema level, outside its table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableForeignKey {
    pub table: String,
    #[serde(flatten)]
    pub foreign_key: ForeignKey,
}

/// The schema-wide fact set handed over by the SQL parser.
///
/// Foreign keys and indexes may be attached to their tables directly or
/// listed here; both end up on the owning [`Table`] when the model is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaFacts {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub foreign_keys: Vec<TableForeignKey>,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl Column {
    /// Create a nullable column, deriving the semantic type and the
    /// length/precision/scale from the SQL type.
    pub fn new(name: &str, sql_type: &str) -> Self {
        let mut column = Column {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            semantic_type: SemanticType::Unknown,
            nullable: true,
            primary_key: false,
            unique: false,
            auto_increment: false,
            length: None,
            precision: None,
            scale: None,
            default_value: None,
            check_constraint: None,
            comment: None,
        };
        column.derive_type_facts();
        column
    }

    /// Fill in whatever the upstream parser left out about the type.
    /// Facts already present are kept.
    pub(crate) fn derive_type_facts(&mut self) {
        if self.semantic_type == SemanticType::Unknown {
            self.semantic_type = SemanticType::from_sql_type(&self.sql_type);
        }

        let (first, second) = parse_sql_type_args(&self.sql_type);
        match self.semantic_type {
            SemanticType::Decimal | SemanticType::Double | SemanticType::Float => {
                if self.precision.is_none() {
                    self.precision = first;
                }
                if self.scale.is_none() {
                    self.scale = second;
                }
            }
            SemanticType::String | SemanticType::Text | SemanticType::Binary => {
                if self.length.is_none() {
                    self.length = first;
                }
            }
            _ => {}
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn check(mut self, expression: &str) -> Self {
        self.check_constraint = Some(expression.to_string());
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Field name in the generated code ("created_at" → "createdAt")
    pub fn field_name(&self) -> String {
        naming::field_name(&self.name)
    }
}

impl ForeignKey {
    /// FK referencing `referenced_table.id`
    pub fn new(column_name: &str, referenced_table: &str) -> Self {
        ForeignKey {
            name: None,
            column_name: column_name.to_string(),
            referenced_table: referenced_table.to_string(),
            referenced_column: default_referenced_column(),
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn referenced_column(mut self, column: &str) -> Self {
        self.referenced_column = column.to_string();
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }
}

impl Index {
    pub fn new(name: &str, table_name: &str, columns: &[&str]) -> Self {
        Index {
            name: name.to_string(),
            table_name: table_name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
            index_type: IndexType::BTree,
            condition: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn using(mut self, index_type: IndexType) -> Self {
        self.index_type = index_type;
        self
    }

    pub fn condition(mut self, predicate: &str) -> Self {
        self.condition = Some(predicate.to_string());
        self
    }
}

impl Table {
    pub fn new(name: &str) -> Self {
        Table {
            name: name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            primary_key_columns: Vec::new(),
            unique_constraints: Vec::new(),
            check_constraints: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        self.foreign_keys.push(foreign_key);
    }

    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    pub fn column(mut self, column: Column) -> Self {
        self.add_column(column);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.add_foreign_key(foreign_key);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.add_index(index);
        self
    }

    /// Declare the primary key explicitly (composite keys)
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn unique_constraint(mut self, columns: &[&str]) -> Self {
        self.unique_constraints.push(UniqueConstraint {
            name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn check_constraint(mut self, expression: &str) -> Self {
        self.check_constraints.push(CheckConstraint {
            name: None,
            expression: expression.to_string(),
        });
        self
    }

    /// Reconcile the primary key list with the per-column flags and derive
    /// missing type facts. Runs once, when the table enters a model.
    pub(crate) fn normalize(&mut self) {
        if self.primary_key_columns.is_empty() {
            self.primary_key_columns = self
                .columns
                .iter()
                .filter(|c| c.primary_key)
                .map(|c| c.name.clone())
                .collect();
        }

        for column in &mut self.columns {
            column.primary_key = self.primary_key_columns.contains(&column.name);
            column.derive_type_facts();
        }
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column_name == column)
    }

    pub fn is_foreign_key_column(&self, column: &str) -> bool {
        self.foreign_key_for(column).is_some()
    }

    /// The declared primary key list, or the flagged columns when the list
    /// is empty
    pub fn effective_primary_key(&self) -> Vec<&str> {
        if self.primary_key_columns.is_empty() {
            self.columns
                .iter()
                .filter(|c| c.primary_key)
                .map(|c| c.name.as_str())
                .collect()
        } else {
            self.primary_key_columns.iter().map(|c| c.as_str()).collect()
        }
    }

    pub fn is_primary_key_column(&self, column: &str) -> bool {
        self.effective_primary_key().contains(&column)
    }

    pub fn has_composite_primary_key(&self) -> bool {
        self.effective_primary_key().len() >= 2
    }

    /// A column is unique when flagged so, or when a single-column unique
    /// constraint or unconditional unique index covers exactly it.
    pub fn is_column_unique(&self, column: &str) -> bool {
        if self.get_column(column).map_or(false, |c| c.unique) {
            return true;
        }

        let single = |cols: &[String]| cols.len() == 1 && cols[0] == column;

        self.unique_constraints.iter().any(|u| single(&u.columns))
            || self
                .indexes
                .iter()
                .any(|i| i.unique && i.condition.is_none() && single(&i.columns))
    }

    pub fn entity_name(&self) -> String {
        naming::entity_name(&self.name)
    }

    pub fn module_name(&self) -> String {
        naming::module_name(&self.name)
    }

    pub fn variable_name(&self) -> String {
        naming::entity_variable_name(&self.name)
    }

    pub fn plural_variable_name(&self) -> String {
        naming::plural_variable_name(&self.name)
    }

    pub fn business_columns(&self) -> Vec<&Column> {
        classifier::business_columns(self)
    }

    pub fn extends_audit_base(&self) -> bool {
        classifier::extends_audit_base(self)
    }
}
