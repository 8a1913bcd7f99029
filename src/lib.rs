pub mod ast;
pub mod classifier;
pub mod error;
pub mod ffi;
pub mod model;
pub mod naming;
pub mod relation;

pub use ast::*;
pub use classifier::{ColumnRole, ValidationHint};
pub use error::ModelError;
pub use model::{ModelView, SchemaModel, TableRelationships};
pub use relation::{is_junction_table, infer_relation_type, JunctionLink, RelationType, TableRelationship};

// Re-export FFI functions for external use
pub use ffi::{
    relgen_build_model,
    relgen_validate_schema,
    relgen_set_model_cache,
    relgen_clear_model_cache,
    relgen_table_relationships,
    relgen_free_string,
    relgen_version,
    RelgenResult,
};
