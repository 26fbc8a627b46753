//! Generation strategies and their composition

use std::sync::Arc;

use fixturegen_types::{Container, Query, Result};

use crate::context::ResolutionContext;

/// A generation strategy.
///
/// Implementations return [`Container::EMPTY`] when they have no opinion on
/// the query and must not mutate it. Nested values are requested through
/// `context.generate(..)` so that every active customization keeps applying
/// across the whole object graph.
pub trait Generator: Send + Sync {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container>;
}

impl<F> Generator for F
where
    F: Fn(&Query, &ResolutionContext) -> Result<Container> + Send + Sync,
{
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        self(query, context)
    }
}

/// Tries strategies left to right and returns the first filled container.
///
/// Every candidate receives the very same query and context references.
/// Errors propagate immediately; only `EMPTY` falls through.
#[derive(Clone, Default)]
pub struct CompositeGenerator {
    generators: Vec<Arc<dyn Generator>>,
}

impl CompositeGenerator {
    pub fn new(generators: Vec<Arc<dyn Generator>>) -> Self {
        Self { generators }
    }

    /// Append a strategy with the lowest precedence so far.
    pub fn push(mut self, generator: impl Generator + 'static) -> Self {
        self.generators.push(Arc::new(generator));
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl Generator for CompositeGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        self.generators
            .iter()
            .try_fold(Container::EMPTY, |result, generator| {
                result.yield_if_empty(|| generator.generate(query, context))
            })
    }
}
