use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// TOML parse / deserialization error.
    SchemaParse(String),
    /// Schema validation error (duplicate id, bad reference, etc.).
    SchemaValidation(String),
    /// A referenced unit does not exist.
    UnknownUnit(String),
    /// A referenced constant does not exist.
    UnknownConstant(String),
    /// A referenced calculation does not exist.
    UnknownCalculation(String),
    /// A referenced instance does not exist.
    UnknownInstance(String),
    /// A referenced claim does not exist.
    UnknownClaim(String),
    /// A referenced question does not exist.
    UnknownQuestion(String),
    /// A resolvable id whose dependency is undefined, where the caller
    /// demanded a definite value.
    UnresolvedReference { id: String, dependency: String },
    /// The dependency graph contains a cycle (load-time only).
    CyclicDependency { nodes: Vec<String> },
    /// Attempted to edit a field that is not an input (derived instances,
    /// anything outside the writer path).
    NotAnInput(String),
}

impl ModelError {
    /// Stable token used in snapshot statuses (`error:<kind>`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemaParse(_) => "schema_parse",
            Self::SchemaValidation(_) => "schema_validation",
            Self::UnknownUnit(_) => "unknown_unit",
            Self::UnknownConstant(_) => "unknown_constant",
            Self::UnknownCalculation(_) => "unknown_calculation",
            Self::UnknownInstance(_) => "unknown_instance",
            Self::UnknownClaim(_) => "unknown_claim",
            Self::UnknownQuestion(_) => "unknown_question",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::CyclicDependency { .. } => "cyclic_dependency",
            Self::NotAnInput(_) => "not_an_input",
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaParse(msg) => write!(f, "schema parse error: {msg}"),
            Self::SchemaValidation(msg) => write!(f, "schema validation error: {msg}"),
            Self::UnknownUnit(id) => write!(f, "unknown unit: {id}"),
            Self::UnknownConstant(id) => write!(f, "unknown constant: {id}"),
            Self::UnknownCalculation(id) => write!(f, "unknown calculation: {id}"),
            Self::UnknownInstance(id) => write!(f, "unknown instance: {id}"),
            Self::UnknownClaim(id) => write!(f, "unknown claim: {id}"),
            Self::UnknownQuestion(id) => write!(f, "unknown question: {id}"),
            Self::UnresolvedReference { id, dependency } => {
                write!(f, "'{id}' depends on '{dependency}', which is undefined")
            }
            Self::CyclicDependency { nodes } => {
                write!(f, "cyclic dependency: {}", nodes.join(" → "))
            }
            Self::NotAnInput(id) => write!(f, "'{id}' is not an editable input"),
        }
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_offending_id() {
        let err = ModelError::UnknownUnit("U_X".into());
        assert_eq!(err.to_string(), "unknown unit: U_X");
        assert_eq!(err.kind(), "unknown_unit");
    }

    #[test]
    fn cyclic_dependency_lists_nodes() {
        let err = ModelError::CyclicDependency {
            nodes: vec!["calculation:F_a".into(), "calculation:F_b".into()],
        };
        assert!(err.to_string().contains("F_a"));
        assert!(err.to_string().contains("F_b"));
    }

    #[test]
    fn unresolved_reference_names_both_ends() {
        let err = ModelError::UnresolvedReference {
            id: "I_x".into(),
            dependency: "F_placeholder".into(),
        };
        assert!(err.to_string().contains("I_x"));
        assert!(err.to_string().contains("F_placeholder"));
        assert_eq!(err.kind(), "unresolved_reference");
    }
}
