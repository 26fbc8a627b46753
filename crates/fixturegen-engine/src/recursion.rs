//! Opt-in recursion guard

use std::sync::Arc;

use fixturegen_types::{Container, Query, Result};
use tracing::trace;

use crate::context::ResolutionContext;
use crate::customizer::Customizer;
use crate::generator::Generator;

/// Resolves a type to an explicit null once it appears on the active path
/// more than `depth` times.
///
/// Without it, self-referential graphs end in
/// [`RecursionLimitExceeded`](fixturegen_types::GenerationError::RecursionLimitExceeded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecursionGuard {
    depth: usize,
}

impl RecursionGuard {
    pub const DEFAULT_DEPTH: usize = 1;

    pub fn new(depth: usize) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for RecursionGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}

impl Customizer for RecursionGuard {
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator> {
        let depth = self.depth;
        Arc::new(
            move |query: &Query, context: &ResolutionContext| -> Result<Container> {
                let occurrences = context.occurrences(query.ty());
                if occurrences > depth {
                    trace!(type_name = %query.ty(), occurrences, "Recursion guarded");
                    return Ok(Container::null());
                }
                generator.generate(query, context)
            },
        )
    }
}
