//! Statically built type-descriptor registry
//!
//! The registry is what the object generator consults instead of runtime
//! reflection: every composite type lists its construction signatures and its
//! settable properties up front.

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::descriptor::{TypeDescriptor, TypeVariable};
use crate::error::RegistryError;

/// Custom construction hook; receives the generated arguments positionally.
pub type BuildFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, String> + Send + Sync>;

/// Custom property writer; receives the instance and the generated value.
pub type WriteFn = Arc<dyn Fn(&mut Value, Value) -> Result<(), String> + Send + Sync>;

/// How the object generator treats a registered type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Built from its constructors and properties.
    Concrete,
    /// Never instantiated directly; needs a strategy such as `UseImplementation`.
    Abstract,
    /// Produced only by leaf generators; registered for its shape.
    Intrinsic,
}

/// A declared constructor or factory parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    /// `None` when the name is not preserved.
    pub name: Option<String>,
    pub declared_type: TypeDescriptor,
}

/// One way of constructing a type.
#[derive(Clone, Default)]
pub struct ConstructorSignature {
    pub parameters: Vec<ParameterSpec>,
    build: Option<BuildFn>,
}

impl ConstructorSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named parameter.
    pub fn param(mut self, name: impl Into<String>, declared_type: TypeDescriptor) -> Self {
        self.parameters.push(ParameterSpec {
            name: Some(name.into()),
            declared_type,
        });
        self
    }

    /// Append a parameter whose name was not preserved.
    pub fn unnamed(mut self, declared_type: TypeDescriptor) -> Self {
        self.parameters.push(ParameterSpec {
            name: None,
            declared_type,
        });
        self
    }

    /// Replace the default object assembly with a custom build function.
    pub fn build_with<F>(mut self, build: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.build = Some(Arc::new(build));
        self
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn build_fn(&self) -> Option<&BuildFn> {
        self.build.as_ref()
    }

    /// Whether this constructor already takes a parameter named `name`.
    pub fn covers(&self, name: &str) -> bool {
        self.parameters
            .iter()
            .any(|p| p.name.as_deref() == Some(name))
    }
}

impl fmt::Debug for ConstructorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorSignature")
            .field("parameters", &self.parameters)
            .field("custom_build", &self.build.is_some())
            .finish()
    }
}

/// An externally writable property.
#[derive(Clone)]
pub struct PropertySpec {
    pub name: String,
    pub declared_type: TypeDescriptor,
    writer: Option<WriteFn>,
}

impl PropertySpec {
    pub fn writer(&self) -> Option<&WriteFn> {
        self.writer.as_ref()
    }
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("custom_writer", &self.writer.is_some())
            .finish()
    }
}

/// Everything the engine knows about one raw type.
#[derive(Clone, Debug)]
pub struct TypeDefinition {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub kind: TypeKind,
    /// Declared interfaces in their generic form, e.g. `Comparable<String>`.
    pub interfaces: Vec<TypeDescriptor>,
    pub constructors: Vec<ConstructorSignature>,
    pub properties: Vec<PropertySpec>,
    /// Raw name of the enclosing type whose variables members may use.
    pub enclosing: Option<String>,
}

impl TypeDefinition {
    fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            kind,
            interfaces: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            enclosing: None,
        }
    }

    pub fn concrete(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Concrete)
    }

    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Abstract)
    }

    pub fn intrinsic(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Intrinsic)
    }

    /// Declare the type parameters, in order.
    pub fn type_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_parameters = names.into_iter().map(Into::into).collect();
        self
    }

    /// Descriptor for one of this type's own variables.
    pub fn var(&self, name: &str) -> TypeDescriptor {
        TypeDescriptor::variable(self.name.clone(), name)
    }

    pub fn enclosed_by(mut self, owner: impl Into<String>) -> Self {
        self.enclosing = Some(owner.into());
        self
    }

    pub fn implements(mut self, interface: TypeDescriptor) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn constructor(mut self, signature: ConstructorSignature) -> Self {
        self.constructors.push(signature);
        self
    }

    pub fn property(mut self, name: impl Into<String>, declared_type: TypeDescriptor) -> Self {
        self.properties.push(PropertySpec {
            name: name.into(),
            declared_type,
            writer: None,
        });
        self
    }

    /// A property written through a custom writer instead of a field insert.
    pub fn property_with<F>(
        mut self,
        name: impl Into<String>,
        declared_type: TypeDescriptor,
        writer: F,
    ) -> Self
    where
        F: Fn(&mut Value, Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.properties.push(PropertySpec {
            name: name.into(),
            declared_type,
            writer: Some(Arc::new(writer)),
        });
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    /// Declared variables in positional order.
    pub fn type_variables(&self) -> Vec<TypeVariable> {
        self.type_parameters
            .iter()
            .map(|p| TypeVariable::new(self.name.clone(), p.clone()))
            .collect()
    }

    /// Constructor with the most parameters; the first declared wins a tie.
    pub fn greediest_constructor(&self) -> Option<&ConstructorSignature> {
        self.constructors
            .iter()
            .fold(None, |best: Option<&ConstructorSignature>, candidate| match best {
                Some(best) if best.arity() >= candidate.arity() => Some(best),
                _ => Some(candidate),
            })
    }

    /// Property with the given name, if declared.
    pub fn find_property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Whether generation ever asks for `name`: a parameter of the greediest
    /// constructor or a declared property.
    pub fn has_member(&self, name: &str) -> bool {
        self.find_property(name).is_some()
            || self
                .greediest_constructor()
                .is_some_and(|constructor| constructor.covers(name))
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let member_types = self
            .constructors
            .iter()
            .flat_map(|c| c.parameters.iter().map(|p| &p.declared_type))
            .chain(self.properties.iter().map(|p| &p.declared_type))
            .chain(self.interfaces.iter());

        for ty in member_types {
            let mut variables = Vec::new();
            collect_variables(ty, &mut variables);
            for variable in variables {
                let own = variable.owner == self.name
                    && self.type_parameters.contains(&variable.name);
                let enclosing = self.enclosing.as_deref() == Some(variable.owner.as_str());
                if !own && !enclosing {
                    return Err(RegistryError::InvalidDefinition {
                        type_name: self.name.clone(),
                        reason: format!(
                            "type variable {}::{} is not declared by this type",
                            variable.owner, variable.name
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

fn collect_variables<'a>(ty: &'a TypeDescriptor, out: &mut Vec<&'a TypeVariable>) {
    match ty {
        TypeDescriptor::Named(_) => {}
        TypeDescriptor::Variable(variable) => out.push(variable),
        TypeDescriptor::Parameterized {
            raw,
            arguments,
            owner,
        } => {
            collect_variables(raw, out);
            for argument in arguments {
                collect_variables(argument, out);
            }
            if let Some(owner) = owner {
                collect_variables(owner, out);
            }
        }
    }
}

/// Registry of type definitions keyed by raw type name.
pub struct TypeRegistry {
    definitions: DashMap<String, Arc<TypeDefinition>>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
        }
    }

    /// A registry holding the shapes of the standard library types the leaf
    /// generators produce, plus the `Comparable<T>` and `CharSequence`
    /// interfaces they declare.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for definition in builtin_definitions() {
            let name = definition.name.clone();
            registry
                .definitions
                .insert(name, Arc::new(definition));
        }
        registry
    }

    /// Register a definition. Names are unique.
    pub fn register(&self, definition: TypeDefinition) -> Result<(), RegistryError> {
        definition.validate()?;

        let name = definition.name.clone();
        match self.definitions.entry(name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateDefinition(name)),
            Entry::Vacant(slot) => {
                debug!(
                    type_name = %name,
                    constructors = definition.constructors.len(),
                    properties = definition.properties.len(),
                    "Type definition registered"
                );
                slot.insert(Arc::new(definition));
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeDefinition>> {
        self.definitions.get(name).map(|d| Arc::clone(d.value()))
    }

    /// Definition for the raw type behind a descriptor.
    pub fn definition_of(&self, ty: &TypeDescriptor) -> Option<Arc<TypeDefinition>> {
        ty.raw_name().and_then(|name| self.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_definitions() -> Vec<TypeDefinition> {
    let comparable = |ty: &str| {
        TypeDescriptor::parameterized("Comparable", vec![TypeDescriptor::named(ty)])
    };

    let mut definitions = vec![
        TypeDefinition::abstract_type("Comparable").type_parameters(["T"]),
        TypeDefinition::abstract_type("CharSequence"),
        TypeDefinition::intrinsic("String")
            .implements(TypeDescriptor::named("CharSequence"))
            .implements(comparable("String")),
        TypeDefinition::intrinsic("Uuid").implements(comparable("Uuid")),
        TypeDefinition::intrinsic("bool").implements(comparable("bool")),
        TypeDefinition::intrinsic("char").implements(comparable("char")),
        TypeDefinition::intrinsic("NaiveDate").implements(comparable("NaiveDate")),
        TypeDefinition::intrinsic("DateTime").implements(comparable("DateTime")),
        TypeDefinition::intrinsic("f32"),
        TypeDefinition::intrinsic("f64"),
        TypeDefinition::intrinsic("Vec").type_parameters(["T"]),
        TypeDefinition::intrinsic("HashSet").type_parameters(["T"]),
        TypeDefinition::intrinsic("BTreeSet").type_parameters(["T"]),
        TypeDefinition::intrinsic("HashMap").type_parameters(["K", "V"]),
        TypeDefinition::intrinsic("BTreeMap").type_parameters(["K", "V"]),
        TypeDefinition::intrinsic("Option").type_parameters(["T"]),
    ];

    for integer in ["i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "usize"] {
        definitions.push(TypeDefinition::intrinsic(integer).implements(comparable(integer)));
    }

    definitions
}
