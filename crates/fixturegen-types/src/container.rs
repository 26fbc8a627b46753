//! Tri-state result of a single generation attempt

use serde_json::Value;

use crate::error::{GenerationError, Result};

/// Result of asking a generator for a value.
///
/// `Empty` means "no opinion" and lets a composite fall through to the next
/// strategy. `Filled(None)` is an explicit null and stops the fall-through just
/// like any other value.
#[derive(Clone, Debug, PartialEq)]
pub enum Container {
    Empty,
    Filled(Option<Value>),
}

impl Container {
    /// The shared "no opinion" sentinel.
    pub const EMPTY: Container = Container::Empty;

    /// Wrap a generated value.
    pub fn filled(value: Value) -> Self {
        Container::Filled(Some(value))
    }

    /// Wrap an explicit null.
    pub fn null() -> Self {
        Container::Filled(None)
    }

    /// Wrap a caller-supplied value; JSON `null` becomes the explicit null.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Container::null(),
            value => Container::filled(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Container::Empty)
    }

    pub fn is_filled(&self) -> bool {
        !self.is_empty()
    }

    /// Returns `self` untouched when filled (null included), otherwise the
    /// container produced by `alternative`.
    pub fn yield_if_empty<F>(self, alternative: F) -> Result<Container>
    where
        F: FnOnce() -> Result<Container>,
    {
        match self {
            Container::Empty => alternative(),
            filled => Ok(filled),
        }
    }

    /// Unwrap the held value, failing with `UnwrapFailed` when empty.
    ///
    /// `query` only feeds the error message.
    pub fn unwrap_or_else_throw(self, query: impl std::fmt::Display) -> Result<Option<Value>> {
        match self {
            Container::Empty => Err(GenerationError::UnwrapFailed {
                query: query.to_string(),
            }),
            Container::Filled(value) => Ok(value),
        }
    }

    /// Borrow the held value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Container::Filled(Some(value)) => Some(value),
            _ => None,
        }
    }

    /// Transform a filled value; empty containers pass through.
    pub fn map<F>(self, f: F) -> Container
    where
        F: FnOnce(Option<Value>) -> Option<Value>,
    {
        match self {
            Container::Empty => Container::Empty,
            Container::Filled(value) => Container::Filled(f(value)),
        }
    }
}

impl From<Value> for Container {
    fn from(value: Value) -> Self {
        Container::from_value(value)
    }
}
