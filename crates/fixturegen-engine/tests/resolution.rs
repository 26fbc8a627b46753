//! End-to-end resolution scenarios over registered types.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use fixturegen_engine::{
    Customizer, EngineConfig, Factory, Generator, RecursionGuard, ResolutionContext,
    UseImplementation,
};
use fixturegen_types::{
    ConstructorSignature, Container, Describe, GenerationError, Query, Result, TypeDefinition,
    TypeDescriptor, TypeRegistry,
};
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Entry<A, B> {
    key: A,
    values: Vec<B>,
}

impl<A: Describe, B: Describe> Describe for Entry<A, B> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("Entry", vec![A::describe(), B::describe()])
    }
}

#[derive(Debug, Deserialize)]
struct Cache<K: std::hash::Hash + Eq, V> {
    index: HashMap<K, V>,
    latest: Entry<K, V>,
    label: String,
}

impl<K: Describe + std::hash::Hash + Eq, V: Describe> Describe for Cache<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("Cache", vec![K::describe(), V::describe()])
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn generic_registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::with_builtins();

    let entry = TypeDefinition::concrete("Entry").type_parameters(["A", "B"]);
    let (a, b) = (entry.var("A"), entry.var("B"));
    registry
        .register(
            entry.constructor(
                ConstructorSignature::new()
                    .param("key", a)
                    .param("values", TypeDescriptor::parameterized("Vec", vec![b])),
            ),
        )
        .unwrap();

    let cache = TypeDefinition::concrete("Cache").type_parameters(["K", "V"]);
    let (k, v) = (cache.var("K"), cache.var("V"));
    registry
        .register(
            cache
                .constructor(
                    ConstructorSignature::new()
                        .param(
                            "index",
                            TypeDescriptor::parameterized("HashMap", vec![k.clone(), v.clone()]),
                        )
                        .param("latest", TypeDescriptor::parameterized("Entry", vec![k, v])),
                )
                .property("label", TypeDescriptor::of::<String>()),
        )
        .unwrap();

    Arc::new(registry)
}

// ---------------------------------------------------------------------------
// Generic substitution
// ---------------------------------------------------------------------------

#[test]
fn member_map_uses_root_bindings() {
    let context = ResolutionContext::new(generic_registry());
    let cache: Cache<String, i32> = context.resolve_as().unwrap();

    assert_eq!(cache.index.len(), 3);
    assert!(cache.index.values().all(|v| *v > 0));
    assert!(!cache.label.is_empty());
}

#[test]
fn substitutions_compose_across_two_levels() {
    let context = ResolutionContext::new(generic_registry());
    let cache: Cache<u8, bool> = context.resolve_as().unwrap();

    assert!(cache.latest.key > 0);
    assert_eq!(cache.latest.values.len(), 3);
}

#[test]
fn nested_queries_carry_substituted_types() {
    let mut context = ResolutionContext::new(generic_registry());
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    context.apply_customizer(Arc::new(
        move |inner: Arc<dyn Generator>| -> Arc<dyn Generator> {
            let recorder = Arc::clone(&recorder);
            Arc::new(move |query: &Query, context: &ResolutionContext| -> Result<Container> {
                if let Some(parameter) = query.as_parameter() {
                    recorder
                        .lock()
                        .unwrap()
                        .push((parameter.name().map(str::to_string), query.ty().to_string()));
                }
                inner.generate(query, context)
            })
        },
    ));

    let _: Cache<String, i64> = context.resolve_as().unwrap();

    let seen = seen.lock().unwrap();
    let names: Vec<_> = seen.iter().map(|(n, t)| (n.as_deref(), t.as_str())).collect();
    assert!(names.contains(&(Some("index"), "HashMap<String, i64>")));
    assert!(names.contains(&(Some("latest"), "Entry<String, i64>")));
    assert!(names.contains(&(Some("key"), "String")));
    assert!(names.contains(&(Some("values"), "Vec<i64>")));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn abstract_type_fails_only_at_resolve() {
    let registry = TypeRegistry::with_builtins();
    registry
        .register(TypeDefinition::abstract_type("Repository"))
        .unwrap();
    let context = ResolutionContext::new(Arc::new(registry));
    let query = Query::from_type(TypeDescriptor::named("Repository"));

    assert!(context.generate(&query).unwrap().is_empty());
    let err = context.resolve(&query).unwrap_err();
    assert!(matches!(err, GenerationError::UnwrapFailed { .. }));
    assert!(err.to_string().contains("Repository"));
}

#[test]
fn conversion_failure_is_reported() {
    let context = ResolutionContext::new(Arc::new(TypeRegistry::with_builtins()));
    let text: Arc<dyn Customizer> = Arc::new(|_: Arc<dyn Generator>| -> Arc<dyn Generator> {
        Arc::new(|_: &Query, _: &ResolutionContext| -> Result<Container> {
            Ok(Container::filled(json!("not a number")))
        })
    });

    assert!(matches!(
        context.branch([text]).resolve_as::<u32>(),
        Err(GenerationError::Conversion(_))
    ));
}

// ---------------------------------------------------------------------------
// Recursion
// ---------------------------------------------------------------------------

fn linked_list() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::with_builtins();
    registry
        .register(
            TypeDefinition::concrete("Node").constructor(
                ConstructorSignature::new()
                    .param("value", TypeDescriptor::of::<i32>())
                    .param(
                        "next",
                        TypeDescriptor::parameterized("Option", vec![TypeDescriptor::named("Node")]),
                    ),
            ),
        )
        .unwrap();
    Arc::new(registry)
}

#[derive(Debug, Deserialize)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

impl Describe for Node {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::named("Node")
    }
}

#[test]
fn self_reference_without_guard_fails_explicitly() {
    init_tracing();
    let context = ResolutionContext::new(linked_list());
    assert!(matches!(
        context.resolve_as::<Node>(),
        Err(GenerationError::RecursionLimitExceeded { .. })
    ));
}

#[test]
fn guarded_self_reference_terminates_with_null() {
    init_tracing();
    let mut context = ResolutionContext::new(linked_list());
    context.apply_customizer(Arc::new(RecursionGuard::new(3)));

    let node: Node = context.resolve_as().unwrap();

    let mut length = 1;
    let mut cursor = &node;
    while let Some(next) = &cursor.next {
        assert!(next.value > 0);
        length += 1;
        cursor = next;
    }
    assert_eq!(length, 3);
}

#[test]
fn limits_come_from_configuration() {
    let context = ResolutionContext::with_config(
        linked_list(),
        EngineConfig::default().with_max_type_repetition(2),
    );
    match context.resolve_as::<Node>() {
        Err(GenerationError::RecursionLimitExceeded { type_name, .. }) => {
            assert_eq!(type_name, "Node")
        }
        other => panic!("unexpected {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Implementations and factories
// ---------------------------------------------------------------------------

#[test]
fn factory_of_bound_interface_produces_implementations() {
    let registry = TypeRegistry::with_builtins();
    registry
        .register(TypeDefinition::abstract_type("Clock"))
        .unwrap();
    registry
        .register(
            TypeDefinition::concrete("FixedClock")
                .implements(TypeDescriptor::named("Clock"))
                .constructor(
                    ConstructorSignature::new().param("epoch", TypeDescriptor::of::<u64>()),
                ),
        )
        .unwrap();

    #[derive(Deserialize)]
    struct Clock {
        epoch: u64,
    }
    impl Describe for Clock {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::named("Clock")
        }
    }

    let mut factory = Factory::<Clock>::new(Arc::new(registry));
    factory.apply_customizer(Arc::new(UseImplementation::new(
        TypeDescriptor::named("Clock"),
        vec![TypeDescriptor::named("FixedClock")],
    )));

    let clocks = factory.get_range(3).unwrap();
    assert_eq!(clocks.len(), 3);
    assert!(clocks.iter().all(|c| c.epoch > 0));
}

#[test]
fn independent_contexts_run_concurrently() {
    let registry = generic_registry();
    let handles: Vec<_> = (0..4)
        .map(|seed| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let context = ResolutionContext::with_config(
                    registry,
                    EngineConfig::default().with_seed(seed),
                );
                let cache: Cache<String, u16> = context.resolve_as().unwrap();
                cache.index.len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
}
