//! Fixturegen Types - the data model of the generation engine
//!
//! This crate holds everything the generator chain passes around:
//!
//! - **Container**: tri-state result of one generation attempt
//! - **TypeDescriptor**: plain, parameterized or variable type shapes
//! - **RuntimeTypeResolver / TypeLens**: substitution and structural matching
//! - **Query**: bare type queries and parameter queries with call-site metadata
//! - **TypeRegistry**: construction signatures and settable properties of
//!   composite types, registered ahead of time instead of reflected
//!
//! ## Values
//!
//! Generated values are dynamic `serde_json::Value` trees; callers convert
//! them into their own types through serde.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod container;
pub mod descriptor;
pub mod error;
pub mod lens;
pub mod query;
pub mod registry;
pub mod resolver;

// Re-exports
pub use container::Container;
pub use descriptor::{Describe, TypeDescriptor, TypeVariable};
pub use error::{GenerationError, RegistryError, Result};
pub use lens::TypeLens;
pub use query::{Executable, ParameterQuery, Query};
pub use registry::{
    BuildFn, ConstructorSignature, ParameterSpec, PropertySpec, TypeDefinition, TypeKind,
    TypeRegistry, WriteFn,
};
pub use resolver::RuntimeTypeResolver;
pub use serde_json::Value;
