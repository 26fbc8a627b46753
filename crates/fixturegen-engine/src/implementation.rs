//! Binding abstract types to concrete implementations

use std::sync::Arc;

use fixturegen_types::{Container, Query, Result, TypeDescriptor, TypeLens};
use rand::Rng;
use tracing::debug;

use crate::context::ResolutionContext;
use crate::customizer::Customizer;
use crate::generator::Generator;

/// Answers queries for `interface` with one of the registered implementations.
///
/// Implementations are picked at random per query. Every other query is
/// delegated untouched.
#[derive(Clone, Debug)]
pub struct UseImplementation {
    interface: TypeDescriptor,
    implementations: Vec<TypeDescriptor>,
}

impl UseImplementation {
    pub fn new(interface: TypeDescriptor, implementations: Vec<TypeDescriptor>) -> Self {
        Self {
            interface,
            implementations,
        }
    }

    pub fn interface(&self) -> &TypeDescriptor {
        &self.interface
    }

    pub fn implementations(&self) -> &[TypeDescriptor] {
        &self.implementations
    }
}

impl Customizer for UseImplementation {
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator> {
        let binding = self.clone();
        Arc::new(
            move |query: &Query, context: &ResolutionContext| -> Result<Container> {
                if binding.implementations.is_empty()
                    || !TypeLens::new(query.ty()).matches(&binding.interface)
                {
                    return generator.generate(query, context);
                }

                let index =
                    context.with_rng(|rng| rng.gen_range(0..binding.implementations.len()));
                let chosen = &binding.implementations[index];
                debug!(interface = %binding.interface, implementation = %chosen, "Implementation chosen");
                context.generate(&Query::from_type(chosen.clone()))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixturegen_types::{ConstructorSignature, GenerationError, TypeDefinition, TypeRegistry};

    fn shapes() -> Arc<TypeRegistry> {
        let registry = TypeRegistry::with_builtins();
        registry
            .register(TypeDefinition::abstract_type("Shape"))
            .unwrap();
        registry
            .register(
                TypeDefinition::concrete("Circle")
                    .implements(TypeDescriptor::named("Shape"))
                    .constructor(
                        ConstructorSignature::new().param("radius", TypeDescriptor::of::<u32>()),
                    ),
            )
            .unwrap();
        registry
            .register(
                TypeDefinition::concrete("Square")
                    .implements(TypeDescriptor::named("Shape"))
                    .constructor(
                        ConstructorSignature::new().param("side", TypeDescriptor::of::<u32>()),
                    ),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn abstract_type_without_binding_cannot_be_resolved() {
        let context = ResolutionContext::new(shapes());
        assert!(matches!(
            context.resolve_type(TypeDescriptor::named("Shape")),
            Err(GenerationError::UnwrapFailed { .. })
        ));
    }

    #[test]
    fn bound_abstract_type_resolves_to_an_implementation() {
        let mut context = ResolutionContext::new(shapes());
        context.apply_customizer(Arc::new(UseImplementation::new(
            TypeDescriptor::named("Shape"),
            vec![TypeDescriptor::named("Circle"), TypeDescriptor::named("Square")],
        )));

        for _ in 0..10 {
            let shape = context
                .resolve_type(TypeDescriptor::named("Shape"))
                .unwrap()
                .unwrap();
            assert!(shape.get("radius").is_some() || shape.get("side").is_some());
        }
    }

    #[test]
    fn other_queries_are_delegated() {
        let mut context = ResolutionContext::new(shapes());
        context.apply_customizer(Arc::new(UseImplementation::new(
            TypeDescriptor::named("Shape"),
            vec![TypeDescriptor::named("Circle")],
        )));

        let square = context
            .resolve_type(TypeDescriptor::named("Square"))
            .unwrap()
            .unwrap();
        assert!(square.get("side").is_some());
    }
}
