//! Declarative per-property overrides for one target type
//!
//! A [`Design`] records literal values, suppliers and nested designs keyed by
//! property name. Applied as a customizer it answers the constructor and
//! setter parameters of its target type that carry a recorded name; every
//! other query falls through.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use fixturegen_engine::{Customizer, Generator, ResolutionContext};
use fixturegen_types::{
    Container, Describe, GenerationError, Query, TypeDescriptor, TypeRegistry, Value,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{DslError, Result};

type Supplier = Arc<dyn Fn() -> serde_json::Result<Value> + Send + Sync>;
type Processor<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// A nested design, with its property type erased.
trait NestedDesign: Send + Sync {
    fn generate(&self, ty: &TypeDescriptor, context: &ResolutionContext)
        -> fixturegen_types::Result<Container>;

    fn validate(&self, registry: &TypeRegistry) -> Result<()>;
}

#[derive(Clone)]
enum Override {
    Literal(Value),
    Supplied(Supplier),
    Nested(Arc<dyn NestedDesign>),
}

/// Override values fixed for one customization.
#[derive(Clone)]
enum Resolved {
    Value(Value),
    Failed(String),
    Nested(Arc<dyn NestedDesign>),
}

/// Overrides resolved for one top-level resolution, keyed by its id.
type OverrideCache = Mutex<Option<(u64, Arc<HashMap<String, Resolved>>)>>;

/// Per-property overrides for `T`.
///
/// Setting a property twice keeps the last value. Suppliers run at most once
/// per top-level resolution: once per [`instantiate`](Design::instantiate)
/// call, and once per `resolve` when the design is applied to a context as a
/// customizer.
pub struct Design<T> {
    target: TypeDescriptor,
    overrides: Vec<(String, Override)>,
    processors: Vec<Processor<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Design<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            overrides: self.overrides.clone(),
            processors: self.processors.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Design<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Design")
            .field("target", &self.target)
            .field(
                "properties",
                &self.overrides.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("processors", &self.processors.len())
            .finish()
    }
}

impl<T> Default for Design<T>
where
    T: Describe + DeserializeOwned + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Design<T>
where
    T: Describe + DeserializeOwned + 'static,
{
    pub fn new() -> Self {
        Self {
            target: T::describe(),
            overrides: Vec::new(),
            processors: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn target(&self) -> &TypeDescriptor {
        &self.target
    }

    /// Fix `property` to a literal value.
    pub fn set(self, property: &str, value: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        self.record(property, Override::Literal(value))
    }

    /// Produce `property` from `supplier`, invoked once per top-level resolution.
    pub fn supply<V, F>(self, property: &str, supplier: F) -> Result<Self>
    where
        V: Serialize,
        F: Fn() -> V + Send + Sync + 'static,
    {
        let supplier: Supplier = Arc::new(move || serde_json::to_value(supplier()));
        self.record(property, Override::Supplied(supplier))
    }

    /// Configure the object-valued `property` with a nested design.
    pub fn design<N, F>(self, property: &str, configure: F) -> Result<Self>
    where
        N: Describe + Serialize + DeserializeOwned + 'static,
        F: FnOnce(Design<N>) -> Result<Design<N>>,
    {
        if property.is_empty() {
            return Err(DslError::EmptyPropertyName);
        }
        let nested = configure(Design::<N>::new())?;
        self.record(property, Override::Nested(Arc::new(nested)))
    }

    /// Run `processor` on every instance after it is generated.
    pub fn process<F>(mut self, processor: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.processors.push(Arc::new(processor));
        self
    }

    fn record(mut self, property: &str, entry: Override) -> Result<Self> {
        if property.is_empty() {
            return Err(DslError::EmptyPropertyName);
        }
        self.overrides.retain(|(name, _)| name != property);
        self.overrides.push((property.to_string(), entry));
        Ok(self)
    }

    /// Every recorded property must exist on a registered target.
    ///
    /// Unregistered targets are not checked here; they fail at resolution.
    pub fn validate(&self, registry: &TypeRegistry) -> Result<()> {
        let Some(definition) = registry.definition_of(&self.target) else {
            return Ok(());
        };

        for (property, entry) in &self.overrides {
            if !definition.has_member(property) {
                return Err(DslError::UnknownProperty {
                    type_name: self.target.to_string(),
                    property: property.clone(),
                });
            }
            if let Override::Nested(nested) = entry {
                nested.validate(registry)?;
            }
        }
        Ok(())
    }

    /// Create one instance in a branch of `context` with this design outermost.
    pub fn instantiate(&self, context: &ResolutionContext) -> Result<T> {
        self.validate(context.registry())?;

        let design: Arc<dyn Customizer> = Arc::new(self.clone());
        let mut instance: T = context.branch([design]).resolve_as()?;
        for processor in &self.processors {
            processor(&mut instance);
        }
        Ok(instance)
    }

    /// `count` independent instantiations.
    pub fn instantiate_n(&self, context: &ResolutionContext, count: usize) -> Result<Vec<T>> {
        (0..count).map(|_| self.instantiate(context)).collect()
    }

    /// Create one instance in a fresh context over `registry`.
    pub fn instantiate_in(&self, registry: Arc<TypeRegistry>) -> Result<T> {
        self.instantiate(&ResolutionContext::new(registry))
    }

    fn records(&self, property: &str) -> bool {
        self.overrides.iter().any(|(name, _)| name == property)
    }

    /// Overrides for resolution `id`, running suppliers only on the first call.
    fn overrides_for(&self, id: u64, cache: &OverrideCache) -> Arc<HashMap<String, Resolved>> {
        let mut cached = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match cached.as_ref() {
            Some((cached_id, overrides)) if *cached_id == id => Arc::clone(overrides),
            _ => {
                let overrides = Arc::new(self.resolve_overrides());
                *cached = Some((id, Arc::clone(&overrides)));
                overrides
            }
        }
    }

    fn resolve_overrides(&self) -> HashMap<String, Resolved> {
        self.overrides
            .iter()
            .map(|(name, entry)| {
                let resolved = match entry {
                    Override::Literal(value) => Resolved::Value(value.clone()),
                    Override::Supplied(supplier) => match supplier() {
                        Ok(value) => Resolved::Value(value),
                        Err(err) => Resolved::Failed(err.to_string()),
                    },
                    Override::Nested(nested) => Resolved::Nested(Arc::clone(nested)),
                };
                (name.clone(), resolved)
            })
            .collect()
    }
}

impl<T> Customizer for Design<T>
where
    T: Describe + DeserializeOwned + 'static,
{
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator> {
        let design = self.clone();
        let cache: OverrideCache = Mutex::new(None);
        debug!(target_type = %design.target, overrides = design.overrides.len(), "Design applied");

        Arc::new(
            move |query: &Query, context: &ResolutionContext| -> fixturegen_types::Result<Container> {
                let target = &design.target;
                let Some(name) = query.as_parameter().and_then(|parameter| {
                    if parameter.declaring_type().raw_name() != target.raw_name() {
                        return None;
                    }
                    parameter.name().filter(|name| design.records(name))
                }) else {
                    return generator.generate(query, context);
                };

                let overrides = design.overrides_for(context.resolution_id(), &cache);
                match overrides.get(name) {
                    None => generator.generate(query, context),
                    Some(Resolved::Value(value)) => Ok(Container::from_value(value.clone())),
                    Some(Resolved::Failed(reason)) => Err(GenerationError::Construction {
                        type_name: target.to_string(),
                        reason: format!("design supplier failed: {reason}"),
                    }),
                    Some(Resolved::Nested(nested)) => nested.generate(query.ty(), context),
                }
            },
        )
    }
}

impl<N> NestedDesign for Design<N>
where
    N: Describe + Serialize + DeserializeOwned + 'static,
{
    fn generate(
        &self,
        ty: &TypeDescriptor,
        context: &ResolutionContext,
    ) -> fixturegen_types::Result<Container> {
        let design: Arc<dyn Customizer> = Arc::new(self.clone());
        let container = context
            .branch([design])
            .generate(&Query::from_type(ty.clone()))?;

        if self.processors.is_empty() {
            return Ok(container);
        }
        match container {
            Container::Filled(Some(value)) => {
                let mut instance: N = serde_json::from_value(value)?;
                for processor in &self.processors {
                    processor(&mut instance);
                }
                Ok(Container::from_value(serde_json::to_value(instance)?))
            }
            other => Ok(other),
        }
    }

    fn validate(&self, registry: &TypeRegistry) -> Result<()> {
        Design::validate(self, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixturegen_types::{
        ConstructorSignature, Executable, ParameterQuery, ParameterSpec, TypeDefinition,
    };
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Serialize, Deserialize)]
    struct Product {
        name: String,
        price: u32,
        description: String,
    }

    impl Describe for Product {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::named("Product")
        }
    }

    #[derive(Debug, Deserialize)]
    struct Point {
        x: i32,
        y: Option<i32>,
    }

    impl Describe for Point {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::named("Point")
        }
    }

    fn context() -> ResolutionContext {
        let registry = TypeRegistry::with_builtins();
        registry
            .register(
                TypeDefinition::concrete("Point")
                    .constructor(
                        ConstructorSignature::new()
                            .param("x", TypeDescriptor::of::<i32>())
                            .param("y", TypeDescriptor::of::<Option<i32>>()),
                    )
                    .constructor(
                        ConstructorSignature::new().param("z", TypeDescriptor::of::<i32>()),
                    ),
            )
            .unwrap();
        registry
            .register(
                TypeDefinition::concrete("Product")
                    .constructor(
                        ConstructorSignature::new()
                            .param("name", TypeDescriptor::of::<String>())
                            .param("price", TypeDescriptor::of::<u32>()),
                    )
                    .property("description", TypeDescriptor::of::<String>()),
            )
            .unwrap();
        ResolutionContext::new(Arc::new(registry))
    }

    #[test]
    fn literals_override_constructor_and_setter_parameters() {
        let product = Design::<Product>::new()
            .set("name", "Laptop")
            .unwrap()
            .set("description", "Thin")
            .unwrap()
            .instantiate(&context())
            .unwrap();

        assert_eq!(product.name, "Laptop");
        assert_eq!(product.description, "Thin");
        assert!(product.price > 0);
    }

    #[test]
    fn last_set_wins() {
        let product = Design::<Product>::new()
            .set("price", 1)
            .unwrap()
            .set("price", 2)
            .unwrap()
            .instantiate(&context())
            .unwrap();
        assert_eq!(product.price, 2);
    }

    #[test]
    fn supplier_runs_once_per_instantiation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let design = Design::<Product>::new()
            .supply("price", move || counter.fetch_add(1, Ordering::SeqCst) as u32 + 100)
            .unwrap();

        let products = design.instantiate_n(&context(), 3).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let prices: Vec<u32> = products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![100, 101, 102]);
    }

    #[test]
    fn processors_run_after_generation() {
        let product = Design::<Product>::new()
            .set("price", 100)
            .unwrap()
            .process(|p: &mut Product| p.price /= 2)
            .instantiate(&context())
            .unwrap();
        assert_eq!(product.price, 50);
    }

    #[test]
    fn empty_and_unknown_properties_are_rejected() {
        assert!(matches!(
            Design::<Product>::new().set("", 1),
            Err(DslError::EmptyPropertyName)
        ));

        let err = Design::<Product>::new()
            .set("colour", "red")
            .unwrap()
            .instantiate(&context())
            .unwrap_err();
        match err {
            DslError::UnknownProperty { type_name, property } => {
                assert_eq!(type_name, "Product");
                assert_eq!(property, "colour");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn design_does_not_leak_into_the_caller_context() {
        let context = context();
        Design::<Product>::new()
            .set("name", "Scoped")
            .unwrap()
            .instantiate(&context)
            .unwrap();

        let plain: Product = context.resolve_as().unwrap();
        assert_ne!(plain.name, "Scoped");
        assert!(context.customizers().is_empty());
    }

    #[test]
    fn parameters_of_unchosen_constructors_are_rejected() {
        let err = Design::<Point>::new()
            .set("z", 5)
            .unwrap()
            .instantiate(&context())
            .unwrap_err();
        assert!(matches!(
            err,
            DslError::UnknownProperty { property, .. } if property == "z"
        ));

        let point = Design::<Point>::new()
            .set("x", 5)
            .unwrap()
            .instantiate(&context())
            .unwrap();
        assert_eq!(point.x, 5);
    }

    #[test]
    fn designed_none_is_the_explicit_null() {
        let context = context();
        let design: Arc<dyn Customizer> =
            Arc::new(Design::<Point>::new().set("y", None::<i32>).unwrap());
        let spec = ParameterSpec {
            name: Some("y".to_string()),
            declared_type: TypeDescriptor::of::<Option<i32>>(),
        };
        let query = Query::from_parameter(ParameterQuery::new(
            TypeDescriptor::of::<Option<i32>>(),
            &spec,
            1,
            Executable::Constructor {
                declaring_type: TypeDescriptor::named("Point"),
                arity: 2,
            },
        ));

        let branch = context.branch([design]);
        assert_eq!(branch.generate(&query).unwrap(), Container::null());
        assert_eq!(branch.resolve(&query).unwrap(), None);

        let point: Point = branch.resolve_as().unwrap();
        assert_eq!(point.y, None);
    }

    #[test]
    fn applied_design_runs_supplier_per_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let design = Design::<Product>::new()
            .supply("price", move || counter.fetch_add(1, Ordering::SeqCst) as u32)
            .unwrap();

        let mut context = context();
        context.apply_customizer(Arc::new(design));
        let prices: Vec<u32> = (0..3)
            .map(|_| context.resolve_as::<Product>().unwrap().price)
            .collect();

        assert_eq!(prices, vec![0, 1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
