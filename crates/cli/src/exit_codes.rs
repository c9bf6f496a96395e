//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                    |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | General error (unspecified)                    |
//! | 2    | CLI usage error (bad args, missing file)       |
//! | 3    | `check` found failing or undefined claims      |
//! | 4    | Schema parse/validation error (incl. cycles)   |
//! | 5    | Evaluation error (unknown id)                  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options, unreadable file.
pub const EXIT_USAGE: u8 = 2;

/// `check` found claims that fail or depend on undefined data.
/// Like `diff(1)`, a nonzero here means "the model does not hold."
pub const EXIT_CLAIMS_FAILING: u8 = 3;

/// Schema could not be parsed or validated (duplicate ids, bad references,
/// cyclic dependencies).
pub const EXIT_SCHEMA: u8 = 4;

/// Evaluation error - a requested id does not exist in the model.
pub const EXIT_EVAL: u8 = 5;

use truthgrid_model::ModelError;

/// Map a ModelError to its exit code.
pub fn model_exit_code(err: &ModelError) -> u8 {
    match err {
        ModelError::SchemaParse(_)
        | ModelError::SchemaValidation(_)
        | ModelError::CyclicDependency { .. } => EXIT_SCHEMA,
        ModelError::UnknownUnit(_)
        | ModelError::UnknownConstant(_)
        | ModelError::UnknownCalculation(_)
        | ModelError::UnknownInstance(_)
        | ModelError::UnknownClaim(_)
        | ModelError::UnknownQuestion(_) => EXIT_EVAL,
        ModelError::UnresolvedReference { .. } | ModelError::NotAnInput(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_map_to_schema_code() {
        assert_eq!(model_exit_code(&ModelError::SchemaParse("x".into())), EXIT_SCHEMA);
        assert_eq!(
            model_exit_code(&ModelError::CyclicDependency { nodes: vec![] }),
            EXIT_SCHEMA
        );
    }

    #[test]
    fn lookup_errors_map_to_eval_code() {
        assert_eq!(model_exit_code(&ModelError::UnknownClaim("CL9".into())), EXIT_EVAL);
    }
}
