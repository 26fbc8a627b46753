//! Type descriptors: the statically known shape of a requested type

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A type parameter declared by a generic type definition.
///
/// Two variables are the same only when both the declaring type and the
/// variable name agree, so `Pair::K` and `Map::K` never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVariable {
    pub owner: String,
    pub name: String,
}

impl TypeVariable {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Description of a requested type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor {
    /// A plain, non-generic type, or a generic type used without arguments.
    Named(String),
    /// A generic type with its arguments bound at a use site.
    Parameterized {
        raw: Box<TypeDescriptor>,
        arguments: Vec<TypeDescriptor>,
        owner: Option<Box<TypeDescriptor>>,
    },
    /// A type variable still waiting for substitution.
    Variable(TypeVariable),
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor::Named(name.into())
    }

    pub fn parameterized(raw: impl Into<String>, arguments: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Parameterized {
            raw: Box::new(TypeDescriptor::named(raw)),
            arguments,
            owner: None,
        }
    }

    /// A parameterized type nested inside another (possibly generic) type.
    pub fn nested(
        owner: TypeDescriptor,
        raw: impl Into<String>,
        arguments: Vec<TypeDescriptor>,
    ) -> Self {
        TypeDescriptor::Parameterized {
            raw: Box::new(TypeDescriptor::named(raw)),
            arguments,
            owner: Some(Box::new(owner)),
        }
    }

    pub fn variable(owner: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDescriptor::Variable(TypeVariable::new(owner, name))
    }

    /// Descriptor of a Rust type that knows its own shape.
    pub fn of<T: Describe>() -> Self {
        T::describe()
    }

    /// Name of the raw (erased) type, or `None` for an unbound variable.
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Named(name) => Some(name.as_str()),
            TypeDescriptor::Parameterized { raw, .. } => raw.raw_name(),
            TypeDescriptor::Variable(_) => None,
        }
    }

    /// Actual type arguments; empty for non-parameterized descriptors.
    pub fn arguments(&self) -> &[TypeDescriptor] {
        match self {
            TypeDescriptor::Parameterized { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub fn owner(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Parameterized { owner, .. } => owner.as_deref(),
            _ => None,
        }
    }

    pub fn is_parameterized(&self) -> bool {
        matches!(self, TypeDescriptor::Parameterized { .. })
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, TypeDescriptor::Variable(_))
    }

    /// Whether any type variable remains anywhere inside this descriptor.
    pub fn has_free_variables(&self) -> bool {
        match self {
            TypeDescriptor::Named(_) => false,
            TypeDescriptor::Variable(_) => true,
            TypeDescriptor::Parameterized {
                raw,
                arguments,
                owner,
            } => {
                raw.has_free_variables()
                    || arguments.iter().any(TypeDescriptor::has_free_variables)
                    || owner.as_deref().is_some_and(TypeDescriptor::has_free_variables)
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Named(name) => write!(f, "{name}"),
            TypeDescriptor::Variable(variable) => write!(f, "{variable}"),
            TypeDescriptor::Parameterized {
                raw,
                arguments,
                owner,
            } => {
                if let Some(owner) = owner {
                    write!(f, "{owner}::")?;
                }
                write!(f, "{raw}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Rust types that can name their own [`TypeDescriptor`].
///
/// User types implement this next to their registered
/// [`TypeDefinition`](crate::TypeDefinition):
///
/// ```rust
/// use fixturegen_types::{Describe, TypeDescriptor};
///
/// struct Product;
///
/// impl Describe for Product {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::named("Product")
///     }
/// }
///
/// assert_eq!(TypeDescriptor::of::<Product>().to_string(), "Product");
/// ```
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_named {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::named($name)
                }
            }
        )*
    };
}

describe_named! {
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    String => "String",
    uuid::Uuid => "Uuid",
    chrono::NaiveDate => "NaiveDate",
    chrono::DateTime<chrono::Utc> => "DateTime",
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("Vec", vec![T::describe()])
    }
}

impl<T: Describe> Describe for HashSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("HashSet", vec![T::describe()])
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("BTreeSet", vec![T::describe()])
    }
}

impl<K: Describe, V: Describe> Describe for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("HashMap", vec![K::describe(), V::describe()])
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("BTreeMap", vec![K::describe(), V::describe()])
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("Option", vec![T::describe()])
    }
}
