//! Model definition, compiled model snapshot and respondent data.
//!
//! `ModelSpec` is the editable definition. `PathModel` is the validated,
//! immutable layout every analysis stage reads. `DataTable` holds the raw
//! respondent data.

pub use self::model::PathModel;
pub use self::registry::{Children, ModelRegistry};
pub use self::spec::ModelSpec;
pub use self::table::{coerce_cell, complete_rows, DataTable};
pub use self::types::*;

mod model;
mod registry;
mod spec;
mod table;
mod types;
