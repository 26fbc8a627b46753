//! Leaf generators for primitives, strings, identifiers, dates and collections

use chrono::{NaiveDate, TimeZone, Utc};
use fixturegen_types::{Container, Query, Result, TypeDescriptor, Value};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Map;

use crate::context::ResolutionContext;
use crate::generator::Generator;

/// Name of a plain (non-parameterized) type.
fn plain_name(query: &Query) -> Option<&str> {
    match query.ty() {
        TypeDescriptor::Named(name) => Some(name.as_str()),
        _ => None,
    }
}

/// Raw name and arguments of a parameterized type.
fn generic_shape(query: &Query) -> Option<(&str, &[TypeDescriptor])> {
    let ty = query.ty();
    match ty {
        TypeDescriptor::Parameterized { arguments, .. } => {
            ty.raw_name().map(|name| (name, arguments.as_slice()))
        }
        _ => None,
    }
}

fn random_uuid(context: &ResolutionContext) -> uuid::Uuid {
    let bytes: [u8; 16] = context.with_rng(|rng| rng.gen());
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

macro_rules! positive_integer {
    ($rng:expr, $ty:ty) => {
        Value::from($rng.gen_range(1..=<$ty>::MAX))
    };
}

/// Positive integers, floats, booleans and characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrimitiveGenerator;

impl Generator for PrimitiveGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        let Some(name) = plain_name(query) else {
            return Ok(Container::EMPTY);
        };

        let value = context.with_rng(|rng| match name {
            "bool" => Some(Value::Bool(rng.gen())),
            "char" => Some(Value::String(char::from(rng.sample(Alphanumeric)).to_string())),
            "i8" => Some(positive_integer!(rng, i8)),
            "i16" => Some(positive_integer!(rng, i16)),
            "i32" => Some(positive_integer!(rng, i32)),
            "i64" => Some(positive_integer!(rng, i64)),
            "u8" => Some(positive_integer!(rng, u8)),
            "u16" => Some(positive_integer!(rng, u16)),
            "u32" => Some(positive_integer!(rng, u32)),
            "u64" => Some(positive_integer!(rng, u64)),
            "usize" => Some(positive_integer!(rng, usize)),
            "f32" => Some(Value::from(rng.gen_range(f32::EPSILON..1_000_000.0_f32))),
            "f64" => Some(Value::from(rng.gen_range(f64::EPSILON..1_000_000.0_f64))),
            _ => None,
        });

        Ok(value.map_or(Container::EMPTY, Container::filled))
    }
}

/// Strings, rendered as random hyphenated UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringGenerator;

impl Generator for StringGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        match plain_name(query) {
            Some("String") => Ok(Container::filled(Value::String(
                random_uuid(context).to_string(),
            ))),
            _ => Ok(Container::EMPTY),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl Generator for UuidGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        match plain_name(query) {
            Some("Uuid") => Ok(Container::filled(serde_json::to_value(random_uuid(
                context,
            ))?)),
            _ => Ok(Container::EMPTY),
        }
    }
}

/// UTC instants and calendar dates within roughly the past year.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateTimeGenerator;

const ONE_YEAR_SECONDS: i64 = 365 * 24 * 60 * 60;

impl Generator for DateTimeGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        let name = match plain_name(query) {
            Some(name @ ("DateTime" | "NaiveDate")) => name,
            _ => return Ok(Container::EMPTY),
        };

        let offset = context.with_rng(|rng| rng.gen_range(0..ONE_YEAR_SECONDS));
        let instant = Utc
            .timestamp_opt(Utc::now().timestamp() - offset, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let value = if name == "DateTime" {
            serde_json::to_value(instant)?
        } else {
            let date: NaiveDate = instant.date_naive();
            serde_json::to_value(date)?
        };
        Ok(Container::filled(value))
    }
}

/// `Option<T>` resolves to a generated `T`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptionGenerator;

impl Generator for OptionGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        match generic_shape(query) {
            Some(("Option", [inner])) => context.generate(&Query::from_type(inner.clone())),
            _ => Ok(Container::EMPTY),
        }
    }
}

/// `Vec<T>`, `HashSet<T>` and `BTreeSet<T>` with the configured element count.
///
/// Sets may come out smaller when generated elements collide.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequenceGenerator;

impl Generator for SequenceGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        let element = match generic_shape(query) {
            Some(("Vec" | "HashSet" | "BTreeSet", [element])) => element,
            _ => return Ok(Container::EMPTY),
        };

        let element_query = Query::from_type(element.clone());
        let items = (0..context.config().collection_size)
            .map(|_| context.resolve_value(&element_query))
            .collect::<Result<Vec<_>>>()?;
        Ok(Container::filled(Value::Array(items)))
    }
}

/// `HashMap<K, V>` and `BTreeMap<K, V>` as JSON objects.
///
/// Keys are rendered as strings; serde parses them back into numeric or
/// boolean key types on conversion.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapGenerator;

impl Generator for MapGenerator {
    fn generate(&self, query: &Query, context: &ResolutionContext) -> Result<Container> {
        let (key, value) = match generic_shape(query) {
            Some(("HashMap" | "BTreeMap", [key, value])) => (key, value),
            _ => return Ok(Container::EMPTY),
        };

        let key_query = Query::from_type(key.clone());
        let value_query = Query::from_type(value.clone());
        let mut entries = Map::new();
        for _ in 0..context.config().collection_size {
            let key = match context.resolve_value(&key_query)? {
                Value::String(key) => key,
                other => other.to_string(),
            };
            entries.insert(key, context.resolve_value(&value_query)?);
        }
        Ok(Container::filled(Value::Object(entries)))
    }
}
