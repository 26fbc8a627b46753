//! Typed factories over a resolution context

use std::marker::PhantomData;
use std::sync::Arc;

use fixturegen_types::{Describe, Result, TypeRegistry};
use serde::de::DeserializeOwned;

use crate::config::EngineConfig;
use crate::context::ResolutionContext;
use crate::customizer::Customizer;

/// Produces values of `T` from its own resolution context.
pub struct Factory<T> {
    context: ResolutionContext,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Factory<T>
where
    T: Describe + DeserializeOwned,
{
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::from_context(ResolutionContext::new(registry))
    }

    pub fn with_config(registry: Arc<TypeRegistry>, config: EngineConfig) -> Self {
        Self::from_context(ResolutionContext::with_config(registry, config))
    }

    pub fn from_context(context: ResolutionContext) -> Self {
        Self {
            context,
            _marker: PhantomData,
        }
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn get(&self) -> Result<T> {
        self.context.resolve_as()
    }

    /// One value with extra customizers that apply to this call only.
    pub fn get_with<I>(&self, customizers: I) -> Result<T>
    where
        I: IntoIterator<Item = Arc<dyn Customizer>>,
    {
        self.context.branch(customizers).resolve_as()
    }

    /// `size` independent top-level resolutions.
    pub fn get_range(&self, size: usize) -> Result<Vec<T>> {
        self.iter().take(size).collect()
    }

    /// Unbounded stream of independently generated values.
    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        std::iter::repeat_with(move || self.get())
    }

    pub fn apply_customizer(&mut self, customizer: Arc<dyn Customizer>) {
        self.context.apply_customizer(customizer);
    }

    pub fn customize<I>(&mut self, customizers: I)
    where
        I: IntoIterator<Item = Arc<dyn Customizer>>,
    {
        self.context.customize(customizers);
    }
}
