//! Static checks on a model definition.
//!
//! The validator runs against a `ModelSpec` *before* any data is touched and
//! reports every problem it finds at once, so a caller can fix the whole
//! definition in one pass.

pub use self::error::{ModelIssue, ModelIssueKind};
pub use self::validator::ModelValidator;

mod error;
mod validator;
mod rules {
    pub mod acyclicity;
    pub mod measurement;
    pub mod structure;
}
