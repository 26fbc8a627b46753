//! Query model: what is being requested

use std::fmt;

use crate::descriptor::{Describe, TypeDescriptor};
use crate::error::{GenerationError, Result};
use crate::registry::ParameterSpec;

/// The executable a parameter belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Executable {
    /// A constructor of `declaring_type`; `arity` tells overloads apart.
    Constructor {
        declaring_type: TypeDescriptor,
        arity: usize,
    },
    /// The single-argument writer of a settable property.
    Setter {
        declaring_type: TypeDescriptor,
        property: String,
    },
}

impl Executable {
    pub fn declaring_type(&self) -> &TypeDescriptor {
        match self {
            Executable::Constructor { declaring_type, .. } => declaring_type,
            Executable::Setter { declaring_type, .. } => declaring_type,
        }
    }
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executable::Constructor {
                declaring_type,
                arity,
            } => write!(f, "constructor {declaring_type}/{arity}"),
            Executable::Setter {
                declaring_type,
                property,
            } => write!(f, "setter {declaring_type}.{property}"),
        }
    }
}

/// A request for a value of some type, enriched with call-site metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterQuery {
    ty: TypeDescriptor,
    declared_type: TypeDescriptor,
    name: Option<String>,
    index: usize,
    executable: Executable,
}

impl ParameterQuery {
    /// `ty` is the requested type after substitution; `declared_type` keeps
    /// the parameter's generic form.
    pub fn new(
        ty: TypeDescriptor,
        parameter: &ParameterSpec,
        index: usize,
        executable: Executable,
    ) -> Self {
        Self {
            ty,
            declared_type: parameter.declared_type.clone(),
            name: parameter.name.clone(),
            index,
            executable,
        }
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared_type
    }

    /// The parameter name; may be absent.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn executable(&self) -> &Executable {
        &self.executable
    }

    pub fn declaring_type(&self) -> &TypeDescriptor {
        self.executable.declaring_type()
    }

    /// The parameter name, failing when it was not preserved.
    pub fn required_name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| GenerationError::ParameterNameUnavailable {
                index: self.index,
                executable: self.executable.to_string(),
            })
    }
}

impl fmt::Display for ParameterQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "parameter {} {} of {}", self.ty, name, self.executable),
            None => write!(
                f,
                "parameter {} #{} of {}",
                self.ty, self.index, self.executable
            ),
        }
    }
}

/// Descriptor of a requested value.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    /// A bare type request.
    Type(TypeDescriptor),
    /// A request coming from a constructor or setter parameter.
    Parameter(ParameterQuery),
}

impl Query {
    pub fn from_type(ty: TypeDescriptor) -> Self {
        Query::Type(ty)
    }

    pub fn of<T: Describe>() -> Self {
        Query::Type(T::describe())
    }

    pub fn from_parameter(query: ParameterQuery) -> Self {
        Query::Parameter(query)
    }

    pub fn ty(&self) -> &TypeDescriptor {
        match self {
            Query::Type(ty) => ty,
            Query::Parameter(parameter) => parameter.ty(),
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterQuery> {
        match self {
            Query::Parameter(parameter) => Some(parameter),
            Query::Type(_) => None,
        }
    }
}

impl From<TypeDescriptor> for Query {
    fn from(ty: TypeDescriptor) -> Self {
        Query::Type(ty)
    }
}

impl From<ParameterQuery> for Query {
    fn from(query: ParameterQuery) -> Self {
        Query::Parameter(query)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Type(ty) => write!(f, "{ty}"),
            Query::Parameter(parameter) => write!(f, "{parameter}"),
        }
    }
}
