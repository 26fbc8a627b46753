//! Argument freezing builders
//!
//! ```ignore
//! let freezer = freeze_argument("stock_quantity")?
//!     .in_type(TypeDescriptor::named("Product"))
//!     .to(42)?;
//! context.apply_customizer(Arc::new(freezer));
//! ```

use std::sync::Arc;

use fixturegen_engine::{Customizer, Generator, ResolutionContext};
use fixturegen_types::{Container, ParameterQuery, Query, TypeDescriptor, Value};
use serde::Serialize;
use tracing::debug;

use crate::error::{DslError, Result};
use crate::predicate::ArgumentPredicate;

/// Freeze parameters named exactly `name`.
pub fn freeze_argument(name: &str) -> Result<FreezeArgument> {
    if name.is_empty() {
        return Err(DslError::EmptyParameterName);
    }
    Ok(FreezeArgument::new(ArgumentPredicate::NameEquals(name.to_string())))
}

/// Freeze parameters named `name` whose requested type matches `ty`.
pub fn freeze_argument_typed(ty: TypeDescriptor, name: &str) -> Result<FreezeArgument> {
    Ok(freeze_argument(name)?.and(ArgumentPredicate::TypeMatches(ty)))
}

/// Freeze every parameter whose requested type matches `ty`.
pub fn freeze_argument_of(ty: TypeDescriptor) -> FreezeArgument {
    FreezeArgument::new(ArgumentPredicate::TypeMatches(ty))
}

/// Freeze parameters whose name ends with `suffix`, ignoring case.
pub fn freeze_argument_ending_with(suffix: &str) -> Result<FreezeArgument> {
    if suffix.is_empty() {
        return Err(DslError::EmptyParameterName);
    }
    Ok(FreezeArgument::new(ArgumentPredicate::NameEndsWithIgnoreCase(
        suffix.to_string(),
    )))
}

pub fn freeze_argument_matching<F>(predicate: F) -> FreezeArgument
where
    F: Fn(&ParameterQuery) -> bool + Send + Sync + 'static,
{
    FreezeArgument::new(ArgumentPredicate::Custom(Arc::new(predicate)))
}

/// Builder collecting the conditions a frozen argument must satisfy.
#[derive(Clone, Debug)]
pub struct FreezeArgument {
    predicates: Vec<ArgumentPredicate>,
}

impl FreezeArgument {
    fn new(predicate: ArgumentPredicate) -> Self {
        Self {
            predicates: vec![predicate],
        }
    }

    /// Narrow to parameters declared by `declaring_type`.
    pub fn in_type(self, declaring_type: TypeDescriptor) -> Self {
        self.and(ArgumentPredicate::DeclaringTypeEquals(declaring_type))
    }

    pub fn and(mut self, predicate: ArgumentPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[ArgumentPredicate] {
        &self.predicates
    }

    /// Finish with the value every matching parameter receives.
    pub fn to(self, value: impl Serialize) -> Result<ArgumentFreezer> {
        Ok(self.to_value(serde_json::to_value(value)?))
    }

    pub fn to_value(self, value: Value) -> ArgumentFreezer {
        ArgumentFreezer {
            predicates: self.predicates.into(),
            value,
        }
    }
}

/// Customizer answering matching parameter queries with a fixed value.
///
/// Bare type queries and non-matching parameters fall through to the
/// wrapped generator.
#[derive(Clone, Debug)]
pub struct ArgumentFreezer {
    predicates: Arc<[ArgumentPredicate]>,
    value: Value,
}

impl ArgumentFreezer {
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn matches(&self, query: &Query) -> bool {
        query
            .as_parameter()
            .is_some_and(|parameter| self.predicates.iter().all(|p| p.test(parameter)))
    }
}

impl Customizer for ArgumentFreezer {
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator> {
        let freezer = self.clone();
        debug!(predicates = ?freezer.predicates, "Freezing argument");
        Arc::new(
            move |query: &Query, context: &ResolutionContext| -> fixturegen_types::Result<Container> {
                if freezer.matches(query) {
                    Ok(Container::from_value(freezer.value.clone()))
                } else {
                    generator.generate(query, context)
                }
            },
        )
    }
}
