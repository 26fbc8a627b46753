//! Error types shared by every fixturegen crate

use thiserror::Error;

/// Failures raised while resolving a query.
///
/// Generators never use these to say "I don't know this type"; that is what
/// an empty [`Container`](crate::Container) is for. Everything here surfaces
/// to the caller of `resolve`.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("object cannot be created with the given query '{query}'; this can happen if the query represents an abstract type with no registered strategy")]
    UnwrapFailed { query: String },

    #[error("failed to construct '{type_name}': {reason}")]
    Construction { type_name: String, reason: String },

    #[error("type '{0}' declares no constructor")]
    NoConstructor(String),

    #[error("unable to determine the parameter name at index {index} of {executable}")]
    ParameterNameUnavailable { index: usize, executable: String },

    #[error("recursion limit exceeded while resolving '{type_name}' at depth {depth}")]
    RecursionLimitExceeded { type_name: String, depth: usize },

    #[error("generated value does not convert into the requested type: {0}")]
    Conversion(#[from] serde_json::Error),
}

/// Failures raised while registering type definitions.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("type definition already registered: {0}")]
    DuplicateDefinition(String),

    #[error("invalid type definition '{type_name}': {reason}")]
    InvalidDefinition { type_name: String, reason: String },
}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;
