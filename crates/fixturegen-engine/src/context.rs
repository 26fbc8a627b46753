//! Resolution context: the live generator pipeline

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use fixturegen_types::{
    Container, Describe, GenerationError, Query, Result, TypeDescriptor, TypeRegistry, Value,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::customizer::Customizer;
use crate::generator::{CompositeGenerator, Generator};
use crate::leaf::{
    DateTimeGenerator, MapGenerator, OptionGenerator, PrimitiveGenerator, SequenceGenerator,
    StringGenerator, UuidGenerator,
};
use crate::object::ObjectGenerator;

/// State shared by a context and all of its branches.
struct SharedState {
    rng: Mutex<StdRng>,
    /// Types on the active resolution path, root first.
    path: Mutex<Vec<TypeDescriptor>>,
    /// Top-level resolutions started so far.
    resolutions: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic inside a generator leaves the data consistent enough to reuse.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Pops the active path when a nested resolution finishes, errors included.
struct PathFrame<'a> {
    shared: &'a SharedState,
}

impl Drop for PathFrame<'_> {
    fn drop(&mut self) {
        lock(&self.shared.path).pop();
    }
}

/// The default strategy chain: leaf generators first, composite objects last.
pub fn default_generator() -> CompositeGenerator {
    CompositeGenerator::default()
        .push(PrimitiveGenerator)
        .push(StringGenerator)
        .push(UuidGenerator)
        .push(DateTimeGenerator)
        .push(OptionGenerator)
        .push(SequenceGenerator)
        .push(MapGenerator)
        .push(ObjectGenerator)
}

/// Orchestrates resolution.
///
/// Holds the effective generator (every applied customizer folded over a
/// base generator, most recent outermost) and hands itself to that generator
/// so nested queries go through the same pipeline as the root.
///
/// A context is meant for one logical test or resolution at a time; separate
/// contexts never share state.
pub struct ResolutionContext {
    registry: Arc<TypeRegistry>,
    config: EngineConfig,
    generator: Arc<dyn Generator>,
    customizers: Vec<Arc<dyn Customizer>>,
    shared: Arc<SharedState>,
}

impl ResolutionContext {
    /// A context over the default generator chain and default configuration.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<TypeRegistry>, config: EngineConfig) -> Self {
        Self::with_generator(registry, config, Arc::new(default_generator()))
    }

    /// A context over a caller-supplied base generator.
    pub fn with_generator(
        registry: Arc<TypeRegistry>,
        config: EngineConfig,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            registry,
            config,
            generator,
            customizers: Vec::new(),
            shared: Arc::new(SharedState {
                rng: Mutex::new(rng),
                path: Mutex::new(Vec::new()),
                resolutions: AtomicU64::new(0),
            }),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_handle(&self) -> Arc<TypeRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Customizers applied so far, oldest first.
    pub fn customizers(&self) -> &[Arc<dyn Customizer>] {
        &self.customizers
    }

    pub fn effective_generator(&self) -> Arc<dyn Generator> {
        Arc::clone(&self.generator)
    }

    /// Wrap the effective generator with `customizer`.
    ///
    /// The new customizer sees every later query before the ones applied
    /// earlier and may delegate to them.
    pub fn apply_customizer(&mut self, customizer: Arc<dyn Customizer>) {
        self.generator = customizer.customize(Arc::clone(&self.generator));
        self.customizers.push(customizer);
        debug!(
            applied = self.customizers.len(),
            "Customizer applied to resolution context"
        );
    }

    /// Apply several customizers in order.
    pub fn customize<I>(&mut self, customizers: I)
    where
        I: IntoIterator<Item = Arc<dyn Customizer>>,
    {
        for customizer in customizers {
            self.apply_customizer(customizer);
        }
    }

    /// A child context with `customizers` applied on top of this one.
    ///
    /// The child shares registry, configuration, random source and active
    /// path; customizations applied to it never reach the parent.
    pub fn branch<I>(&self, customizers: I) -> ResolutionContext
    where
        I: IntoIterator<Item = Arc<dyn Customizer>>,
    {
        let mut child = ResolutionContext {
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
            generator: Arc::clone(&self.generator),
            customizers: self.customizers.clone(),
            shared: Arc::clone(&self.shared),
        };
        child.customize(customizers);
        child
    }

    /// Run the effective generator for `query`.
    ///
    /// This is the entry point for nested requests: it keeps every applied
    /// customization active across the whole object graph.
    pub fn generate(&self, query: &Query) -> Result<Container> {
        let _frame = self.enter(query.ty())?;
        trace!(query = %query, "Dispatching query");
        self.generator.generate(query, self)
    }

    /// Generate and unwrap; fails when the whole chain had no opinion.
    pub fn resolve(&self, query: &Query) -> Result<Option<Value>> {
        let container = self.generate(query)?;
        container.unwrap_or_else_throw(query).inspect_err(|err| {
            warn!(query = %query, error = %err, "Query could not be resolved");
        })
    }

    pub fn resolve_type(&self, ty: TypeDescriptor) -> Result<Option<Value>> {
        self.resolve(&Query::from_type(ty))
    }

    /// Resolve and render an explicit null as JSON `null`.
    pub fn resolve_value(&self, query: &Query) -> Result<Value> {
        Ok(self.resolve(query)?.unwrap_or(Value::Null))
    }

    /// Resolve a Rust type through its descriptor and convert the result.
    pub fn resolve_as<T>(&self) -> Result<T>
    where
        T: Describe + DeserializeOwned,
    {
        let value = self.resolve_value(&Query::of::<T>())?;
        Ok(serde_json::from_value(value)?)
    }

    /// Borrow the context's random source.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = lock(&self.shared.rng);
        f(&mut rng)
    }

    /// Number of active resolutions of `ty`, the current one included.
    pub fn occurrences(&self, ty: &TypeDescriptor) -> usize {
        lock(&self.shared.path).iter().filter(|t| *t == ty).count()
    }

    /// Identifier of the top-level resolution currently running.
    ///
    /// Bumped whenever a query enters with an empty path, so every nested
    /// query of one root shares the same id. Branches share the counter.
    pub fn resolution_id(&self) -> u64 {
        self.shared.resolutions.load(Ordering::SeqCst)
    }

    /// Depth of the active resolution path.
    pub fn depth(&self) -> usize {
        lock(&self.shared.path).len()
    }

    fn enter(&self, ty: &TypeDescriptor) -> Result<PathFrame<'_>> {
        let mut path = lock(&self.shared.path);
        let depth = path.len() + 1;
        let repetition = path.iter().filter(|t| *t == ty).count() + 1;

        if depth > self.config.max_depth || repetition > self.config.max_type_repetition {
            warn!(
                type_name = %ty,
                depth,
                repetition,
                "Recursion limit exceeded"
            );
            return Err(GenerationError::RecursionLimitExceeded {
                type_name: ty.to_string(),
                depth,
            });
        }

        if path.is_empty() {
            self.shared.resolutions.fetch_add(1, Ordering::SeqCst);
        }
        path.push(ty.clone());
        Ok(PathFrame {
            shared: &self.shared,
        })
    }
}
