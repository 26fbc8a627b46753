//! Error types for the customization DSL

use fixturegen_types::GenerationError;
use thiserror::Error;

/// Failures raised by DSL builders and design instantiation.
///
/// Builder preconditions fail at call time, before anything is generated.
#[derive(Error, Debug)]
pub enum DslError {
    #[error("property name must not be empty")]
    EmptyPropertyName,

    #[error("parameter name must not be empty")]
    EmptyParameterName,

    #[error("at least one matching policy is required")]
    NoMatchingPolicy,

    #[error("type '{type_name}' has no constructor parameter or property named '{property}'")]
    UnknownProperty { type_name: String, property: String },

    #[error("value cannot be represented: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Result type for DSL operations
pub type Result<T> = std::result::Result<T, DslError>;
