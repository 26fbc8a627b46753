//! Fixturegen Engine - recursive resolution of arbitrary values
//!
//! A [`ResolutionContext`] owns one effective [`Generator`]: the base chain
//! with every applied [`Customizer`] folded over it, most recent outermost.
//! Composite types are built by the [`ObjectGenerator`], which asks the same
//! context for each constructor argument and property, so customizations
//! reach every level of the object graph.
//!
//! ## Strategy Chain
//!
//! 1. **Leaf generators**: primitives, strings, identifiers, dates,
//!    collections and `Option`
//! 2. **Object generator**: the greediest constructor of a registered type,
//!    then its remaining writable properties
//!
//! A generator with no opinion returns an empty container and the chain
//! moves on; the first filled container wins.
//!
//! ## Recursion
//!
//! Every context bounds the active resolution path (`max_depth`,
//! `max_type_repetition`) and fails with `RecursionLimitExceeded` instead of
//! overflowing the stack. [`RecursionGuard`] turns deep repetitions into
//! explicit nulls instead.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod context;
pub mod customizer;
pub mod factory;
pub mod generator;
pub mod implementation;
pub mod leaf;
pub mod object;
pub mod recursion;

// Re-exports
pub use config::EngineConfig;
pub use context::{default_generator, ResolutionContext};
pub use customizer::{CompositeCustomizer, Customizer};
pub use factory::Factory;
pub use generator::{CompositeGenerator, Generator};
pub use implementation::UseImplementation;
pub use leaf::{
    DateTimeGenerator, MapGenerator, OptionGenerator, PrimitiveGenerator, SequenceGenerator,
    StringGenerator, UuidGenerator,
};
pub use object::ObjectGenerator;
pub use recursion::RecursionGuard;
