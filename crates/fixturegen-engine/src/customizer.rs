//! Customizers: generator-to-generator transformations

use std::sync::Arc;

use crate::generator::Generator;

/// Wraps a generator with additional behavior.
///
/// The returned generator typically handles the queries it cares about and
/// delegates everything else to the generator it was given.
pub trait Customizer: Send + Sync {
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator>;
}

impl<F> Customizer for F
where
    F: Fn(Arc<dyn Generator>) -> Arc<dyn Generator> + Send + Sync,
{
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator> {
        self(generator)
    }
}

/// Applies its customizers in order, so the last one ends up outermost.
#[derive(Clone, Default)]
pub struct CompositeCustomizer {
    customizers: Vec<Arc<dyn Customizer>>,
}

impl CompositeCustomizer {
    pub fn new(customizers: Vec<Arc<dyn Customizer>>) -> Self {
        Self { customizers }
    }

    pub fn push(mut self, customizer: impl Customizer + 'static) -> Self {
        self.customizers.push(Arc::new(customizer));
        self
    }

    pub fn len(&self) -> usize {
        self.customizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customizers.is_empty()
    }
}

impl Customizer for CompositeCustomizer {
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator> {
        self.customizers
            .iter()
            .fold(generator, |inner, customizer| customizer.customize(inner))
    }
}
