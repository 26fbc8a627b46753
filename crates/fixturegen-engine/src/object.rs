//! Composite object construction from registered type definitions

use fixturegen_types::{
    Container, ConstructorSignature, Executable, GenerationError, ParameterQuery, ParameterSpec,
    Query, Result, RuntimeTypeResolver, TypeDefinition, TypeDescriptor, TypeKind, Value,
};
use serde_json::Map;
use tracing::debug;

use crate::context::ResolutionContext;
use crate::generator::Generator;

/// Builds concrete registered types.
///
/// Picks the constructor with the most parameters, resolves each parameter
/// through the context as a parameter query, then fills every writable
/// property the constructor did not already take. Unregistered, abstract and
/// intrinsic types are left to other strategies.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectGenerator;

impl Generator for ObjectGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        let ty = query.ty();
        let Some(definition) = context.registry().definition_of(ty) else {
            return Ok(Container::EMPTY);
        };
        if definition.kind != TypeKind::Concrete {
            return Ok(Container::EMPTY);
        }

        let resolver = RuntimeTypeResolver::create(ty, context.registry());
        let constructor = definition
            .greediest_constructor()
            .ok_or_else(|| GenerationError::NoConstructor(ty.to_string()))?;

        let mut instance = construct(ty, constructor, &resolver, context)?;
        populate(ty, &definition, constructor, &mut instance, &resolver, context)?;

        debug!(
            type_name = %ty,
            arity = constructor.arity(),
            "Object generated"
        );
        Ok(Container::filled(instance))
    }
}

fn construct(
    ty: &TypeDescriptor,
    constructor: &ConstructorSignature,
    resolver: &RuntimeTypeResolver,
    context: &ResolutionContext,
) -> Result<Value> {
    let executable = Executable::Constructor {
        declaring_type: ty.clone(),
        arity: constructor.arity(),
    };

    let queries: Vec<ParameterQuery> = constructor
        .parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| {
            ParameterQuery::new(
                resolver.resolve(&parameter.declared_type),
                parameter,
                index,
                executable.clone(),
            )
        })
        .collect();

    // Default assembly keys arguments by name, so every name must be known.
    if constructor.build_fn().is_none() {
        for query in &queries {
            query.required_name()?;
        }
    }

    let mut arguments = Vec::with_capacity(queries.len());
    for query in &queries {
        arguments.push(context.resolve_value(&Query::from_parameter(query.clone()))?);
    }

    match constructor.build_fn() {
        Some(build) => build(arguments).map_err(|reason| GenerationError::Construction {
            type_name: ty.to_string(),
            reason,
        }),
        None => {
            let mut object = Map::new();
            for (query, argument) in queries.iter().zip(arguments) {
                object.insert(query.required_name()?.to_string(), argument);
            }
            Ok(Value::Object(object))
        }
    }
}

fn populate(
    ty: &TypeDescriptor,
    definition: &TypeDefinition,
    constructor: &ConstructorSignature,
    instance: &mut Value,
    resolver: &RuntimeTypeResolver,
    context: &ResolutionContext,
) -> Result<()> {
    for property in &definition.properties {
        if constructor.covers(&property.name) {
            continue;
        }

        let parameter = ParameterSpec {
            name: Some(property.name.clone()),
            declared_type: property.declared_type.clone(),
        };
        let query = ParameterQuery::new(
            resolver.resolve(&property.declared_type),
            &parameter,
            0,
            Executable::Setter {
                declaring_type: ty.clone(),
                property: property.name.clone(),
            },
        );
        let value = context.resolve_value(&Query::from_parameter(query))?;

        match property.writer() {
            Some(write) => write(&mut *instance, value).map_err(|reason| {
                GenerationError::Construction {
                    type_name: ty.to_string(),
                    reason,
                }
            })?,
            None => match instance.as_object_mut() {
                Some(object) => {
                    object.insert(property.name.clone(), value);
                }
                None => {
                    return Err(GenerationError::Construction {
                        type_name: ty.to_string(),
                        reason: format!(
                            "property '{}' needs a custom writer on a non-object instance",
                            property.name
                        ),
                    })
                }
            },
        }
    }
    Ok(())
}
