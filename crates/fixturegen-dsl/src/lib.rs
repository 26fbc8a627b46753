//! Fixturegen DSL - declarative customizers for the resolution engine
//!
//! Everything here produces a [`Customizer`](fixturegen_engine::Customizer)
//! that plugs into a `ResolutionContext`:
//!
//! - **Argument freezing**: `freeze_argument(name).in_type(ty).to(value)`
//!   pins matching constructor and setter parameters anywhere in the graph
//! - **Matching policies**: [`FreezeBy`] answers queries by exact type,
//!   implemented interface or parameter name
//! - **Designs**: [`Design`] records per-property literals, suppliers and
//!   nested designs for one target type
//!
//! Builder preconditions (empty names, missing policies) fail when the
//! builder is called, never during generation.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod design;
pub mod error;
pub mod freeze;
pub mod matching;
pub mod predicate;

// Re-exports
pub use design::Design;
pub use error::{DslError, Result};
pub use freeze::{
    freeze_argument, freeze_argument_ending_with, freeze_argument_matching, freeze_argument_of,
    freeze_argument_typed, ArgumentFreezer, FreezeArgument,
};
pub use matching::{FreezeBy, Matching, ParameterNameMatch};
pub use predicate::{ArgumentPredicate, QueryPredicate};
