//! Attribute values and the per-request context.
//!
//! A request context maps attribute category and id to one or more values.
//! It is created per decision request, read-only to the engine, and discarded
//! once the decision is produced.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attribute value carried in a request context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// String value
    String(String),
    /// Ordered list of values
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Name of the value's type, for diagnostics
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{:?}", s),
            Self::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Per-request attribute mapping: category, then attribute id, to values.
///
/// Iteration order is insertion order, so substitution and diagnostics are
/// deterministic for a given context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Attributes grouped by category
    #[serde(default)]
    pub attributes: IndexMap<String, IndexMap<String, Vec<AttributeValue>>>,
}

impl RequestContext {
    /// Create an empty request context
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: IndexMap::new(),
        }
    }

    /// Append a value under the given category and attribute id
    #[must_use]
    pub fn with_attribute(
        mut self,
        category: &str,
        id: &str,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes
            .entry(category.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default()
            .push(value.into());
        self
    }

    /// Values for a category and attribute id, if present
    #[must_use]
    pub fn get(&self, category: &str, id: &str) -> Option<&[AttributeValue]> {
        self.attributes
            .get(category)
            .and_then(|ids| ids.get(id))
            .map(Vec::as_slice)
    }

    /// Whether a category and attribute id has at least one value
    #[must_use]
    pub fn contains(&self, category: &str, id: &str) -> bool {
        self.get(category, id).is_some_and(|values| !values.is_empty())
    }

    /// Whether the context carries no attributes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.values().all(IndexMap::is_empty)
    }
}
