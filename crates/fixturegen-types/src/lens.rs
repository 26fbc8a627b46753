//! Structural type matching

use crate::descriptor::TypeDescriptor;
use crate::registry::TypeRegistry;
use crate::resolver::RuntimeTypeResolver;

/// Read-only structural view over a [`TypeDescriptor`].
#[derive(Clone, Copy, Debug)]
pub struct TypeLens<'a> {
    ty: &'a TypeDescriptor,
}

impl<'a> TypeLens<'a> {
    pub fn new(ty: &'a TypeDescriptor) -> Self {
        Self { ty }
    }

    /// Identical raw types and, when parameterized, element-wise matching
    /// arguments (order-sensitive, recursive).
    pub fn matches(&self, other: &TypeDescriptor) -> bool {
        matches(self.ty, other)
    }

    /// Whether the viewed type is a concrete registered type that declares
    /// `interface`, directly or through the interfaces it extends.
    ///
    /// Declared interfaces are compared in their generic form, so a type
    /// implementing `Comparable<String>` does not match `Comparable<i32>`.
    /// An unparameterized `interface` matches any instantiation of that raw
    /// interface.
    pub fn implements_interface(&self, interface: &TypeDescriptor, registry: &TypeRegistry) -> bool {
        let Some(definition) = registry.definition_of(self.ty) else {
            return false;
        };
        if definition.is_abstract() {
            return false;
        }
        let resolver = RuntimeTypeResolver::create(self.ty, registry);
        let declared = definition.interfaces.iter().map(|i| resolver.resolve(i));
        declares(declared.collect(), interface, registry, 0)
    }
}

const MAX_INTERFACE_DEPTH: usize = 32;

fn declares(
    declared: Vec<TypeDescriptor>,
    interface: &TypeDescriptor,
    registry: &TypeRegistry,
    depth: usize,
) -> bool {
    if depth > MAX_INTERFACE_DEPTH {
        return false;
    }

    for candidate in declared {
        if interface_matches(&candidate, interface) {
            return true;
        }

        // Interfaces extending other interfaces
        if let Some(definition) = registry.definition_of(&candidate) {
            let resolver = RuntimeTypeResolver::create(&candidate, registry);
            let inherited = definition
                .interfaces
                .iter()
                .map(|i| resolver.resolve(i))
                .collect();
            if declares(inherited, interface, registry, depth + 1) {
                return true;
            }
        }
    }
    false
}

fn interface_matches(declared: &TypeDescriptor, requested: &TypeDescriptor) -> bool {
    match requested {
        TypeDescriptor::Named(name) => declared.raw_name() == Some(name.as_str()),
        _ => matches(declared, requested),
    }
}

fn matches(left: &TypeDescriptor, right: &TypeDescriptor) -> bool {
    if left == right {
        return true;
    }

    match (left, right) {
        (
            TypeDescriptor::Parameterized {
                raw: left_raw,
                arguments: left_arguments,
                ..
            },
            TypeDescriptor::Parameterized {
                raw: right_raw,
                arguments: right_arguments,
                ..
            },
        ) => {
            left_raw == right_raw
                && left_arguments.len() == right_arguments.len()
                && left_arguments
                    .iter()
                    .zip(right_arguments)
                    .all(|(l, r)| matches(l, r))
        }
        _ => false,
    }
}
