//! Matching policies and value freezing by policy

use std::sync::Arc;

use fixturegen_engine::{Customizer, Generator, ResolutionContext};
use fixturegen_types::{Container, Query, TypeDescriptor, TypeLens, TypeRegistry, Value};
use serde::Serialize;
use tracing::debug;

use crate::error::{DslError, Result};
use crate::predicate::ArgumentPredicate;

/// Name-based matching with optional narrowing.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterNameMatch {
    name: String,
    ignore_case: bool,
    declaring_type: Option<TypeDescriptor>,
    parameter_type: Option<TypeDescriptor>,
}

impl ParameterNameMatch {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DslError::EmptyParameterName);
        }
        Ok(Self {
            name,
            ignore_case: false,
            declaring_type: None,
            parameter_type: None,
        })
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Only parameters of executables declared by `declaring_type`.
    pub fn in_type(mut self, declaring_type: TypeDescriptor) -> Self {
        self.declaring_type = Some(declaring_type);
        self
    }

    /// Only parameters whose requested type matches `parameter_type`.
    pub fn of_type(mut self, parameter_type: TypeDescriptor) -> Self {
        self.parameter_type = Some(parameter_type);
        self
    }

    fn matches(&self, query: &Query) -> bool {
        let Some(parameter) = query.as_parameter() else {
            return false;
        };
        let Some(name) = parameter.name() else {
            return false;
        };

        let name_matches = if self.ignore_case {
            name.eq_ignore_ascii_case(&self.name)
        } else {
            name == self.name
        };

        name_matches
            && self.declaring_type.as_ref().map_or(true, |ty| {
                ArgumentPredicate::DeclaringTypeEquals(ty.clone()).test(parameter)
            })
            && self
                .parameter_type
                .as_ref()
                .map_or(true, |ty| TypeLens::new(parameter.ty()).matches(ty))
    }
}

/// How a frozen value decides which queries it answers.
#[derive(Clone, Debug, PartialEq)]
pub enum Matching {
    /// The query type equals the frozen value's type.
    ExactType,
    /// The frozen value's type implements the queried interface.
    ImplementedInterfaces,
    /// A parameter query with a matching name.
    ParameterName(ParameterNameMatch),
}

impl Matching {
    /// Shorthand for an exact, unrestricted name match.
    pub fn parameter_name(name: impl Into<String>) -> Result<Self> {
        Ok(Matching::ParameterName(ParameterNameMatch::new(name)?))
    }

    pub fn matches(&self, target_type: &TypeDescriptor, query: &Query, registry: &TypeRegistry) -> bool {
        match self {
            Matching::ExactType => TypeLens::new(query.ty()).matches(target_type),
            Matching::ImplementedInterfaces => {
                TypeLens::new(target_type).implements_interface(query.ty(), registry)
            }
            Matching::ParameterName(by_name) => by_name.matches(query),
        }
    }
}

/// Answers every query that any of its policies matches with one fixed value.
#[derive(Clone, Debug)]
pub struct FreezeBy {
    target_type: TypeDescriptor,
    value: Value,
    policies: Vec<Matching>,
}

impl FreezeBy {
    pub fn new(
        target_type: TypeDescriptor,
        value: impl Serialize,
        policies: Vec<Matching>,
    ) -> Result<Self> {
        if policies.is_empty() {
            return Err(DslError::NoMatchingPolicy);
        }
        Ok(Self {
            target_type,
            value: serde_json::to_value(value)?,
            policies,
        })
    }

    pub fn target_type(&self) -> &TypeDescriptor {
        &self.target_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn policies(&self) -> &[Matching] {
        &self.policies
    }

    fn answers(&self, query: &Query, registry: &TypeRegistry) -> bool {
        self.policies
            .iter()
            .any(|policy| policy.matches(&self.target_type, query, registry))
    }
}

impl Customizer for FreezeBy {
    fn customize(&self, generator: Arc<dyn Generator>) -> Arc<dyn Generator> {
        let freeze = self.clone();
        debug!(
            target_type = %freeze.target_type,
            policies = freeze.policies.len(),
            "Freezing value by policy"
        );
        Arc::new(
            move |query: &Query, context: &ResolutionContext| -> fixturegen_types::Result<Container> {
                if freeze.answers(query, context.registry()) {
                    Ok(Container::from_value(freeze.value.clone()))
                } else {
                    generator.generate(query, context)
                }
            },
        )
    }
}
