//! Predicates over parameter queries

use std::fmt;
use std::sync::Arc;

use fixturegen_types::{ParameterQuery, TypeDescriptor, TypeLens};

/// Custom predicate over a parameter query.
pub type QueryPredicate = Arc<dyn Fn(&ParameterQuery) -> bool + Send + Sync>;

/// One condition an argument freezer checks; freezers require all of theirs.
#[derive(Clone)]
pub enum ArgumentPredicate {
    /// Parameter name equals the given name exactly.
    NameEquals(String),
    /// Parameter name ends with the given suffix, ignoring ASCII case.
    NameEndsWithIgnoreCase(String),
    /// Requested type structurally matches the given type.
    TypeMatches(TypeDescriptor),
    /// The parameter belongs to an executable of the given raw type.
    DeclaringTypeEquals(TypeDescriptor),
    Custom(QueryPredicate),
}

impl ArgumentPredicate {
    /// Parameters without a preserved name never satisfy name predicates.
    pub fn test(&self, query: &ParameterQuery) -> bool {
        match self {
            ArgumentPredicate::NameEquals(name) => query.name() == Some(name.as_str()),
            ArgumentPredicate::NameEndsWithIgnoreCase(suffix) => query
                .name()
                .is_some_and(|name| ends_with_ignore_case(name, suffix)),
            ArgumentPredicate::TypeMatches(ty) => TypeLens::new(query.ty()).matches(ty),
            ArgumentPredicate::DeclaringTypeEquals(ty) => {
                ty.raw_name().is_some() && query.declaring_type().raw_name() == ty.raw_name()
            }
            ArgumentPredicate::Custom(predicate) => predicate(query),
        }
    }
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.ends_with(suffix) || name.to_lowercase().ends_with(&suffix.to_lowercase())
}

impl fmt::Debug for ArgumentPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentPredicate::NameEquals(name) => write!(f, "NameEquals({name:?})"),
            ArgumentPredicate::NameEndsWithIgnoreCase(suffix) => {
                write!(f, "NameEndsWithIgnoreCase({suffix:?})")
            }
            ArgumentPredicate::TypeMatches(ty) => write!(f, "TypeMatches({ty})"),
            ArgumentPredicate::DeclaringTypeEquals(ty) => write!(f, "DeclaringTypeEquals({ty})"),
            ArgumentPredicate::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
