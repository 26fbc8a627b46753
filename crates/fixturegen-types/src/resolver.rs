//! Generic type-variable substitution

use std::collections::HashMap;

use crate::descriptor::{TypeDescriptor, TypeVariable};
use crate::registry::TypeRegistry;

/// Substitutes type variables bound by a parameterized root type.
///
/// The map is built once per root: the raw type's declared parameters are
/// zipped positionally with the root's actual arguments. Bindings of the
/// owner type are included first, so members of a nested generic type can
/// refer to variables of the enclosing declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuntimeTypeResolver {
    map: HashMap<TypeVariable, TypeDescriptor>,
}

impl RuntimeTypeResolver {
    /// A resolver that substitutes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn create(root: &TypeDescriptor, registry: &TypeRegistry) -> Self {
        let mut resolver = Self::empty();
        resolver.bind(root, registry);
        resolver
    }

    fn bind(&mut self, ty: &TypeDescriptor, registry: &TypeRegistry) {
        let TypeDescriptor::Parameterized {
            arguments, owner, ..
        } = ty
        else {
            return;
        };

        if let Some(owner) = owner {
            self.bind(owner, registry);
        }

        let Some(definition) = registry.definition_of(ty) else {
            return;
        };

        for (variable, argument) in definition.type_variables().into_iter().zip(arguments) {
            self.map.entry(variable).or_insert_with(|| argument.clone());
        }
    }

    /// Bound value for a variable, if any.
    pub fn lookup(&self, variable: &TypeVariable) -> Option<&TypeDescriptor> {
        self.map.get(variable)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Substitute every bound variable inside `ty`.
    ///
    /// Unbound variables and plain types come back unchanged; parameterized
    /// types are rebuilt from their resolved raw type, owner and arguments.
    pub fn resolve(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        match ty {
            TypeDescriptor::Variable(variable) => self
                .map
                .get(variable)
                .cloned()
                .unwrap_or_else(|| ty.clone()),
            TypeDescriptor::Parameterized {
                raw,
                arguments,
                owner,
            } => TypeDescriptor::Parameterized {
                raw: Box::new(self.resolve(raw)),
                arguments: arguments.iter().map(|a| self.resolve(a)).collect(),
                owner: owner.as_ref().map(|o| Box::new(self.resolve(o))),
            },
            TypeDescriptor::Named(_) => ty.clone(),
        }
    }
}
