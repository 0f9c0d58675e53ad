//! Search request normalisation and pagination
//!
//! A search arrives either as a single free-text token or as a partial
//! structured filter. It is resolved once into [`SearchQuery`] at the request
//! boundary and then lowered into a [`SearchPredicate`], which is the only form
//! the statement layer ever sees.

use serde::{Deserialize, Serialize};

use crate::data::CoreError;
use crate::services::query::statement::GraphStatement;

/// Sentinel for "no limit" in raw pagination input.
pub const UNBOUNDED: i64 = -1;

/// Offset and limit applied to the engine's natural result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Page {
    /// Every match, no skip.
    pub fn all() -> Self {
        Page::default()
    }

    pub fn new(offset: u64, limit: Option<u64>) -> Self {
        Page { offset, limit }
    }

    /// Reads the wire convention: `limit = -1` is unbounded, `offset = 0` is no
    /// skip. `offset = -1` is accepted as an older spelling of `0`.
    pub fn from_raw(limit: i64, offset: i64) -> Result<Self, CoreError> {
        let limit = match limit {
            UNBOUNDED => None,
            l if l >= 0 => Some(l as u64),
            l => {
                return Err(CoreError::invalid_shape(format!(
                    "limit must be -1 or a non-negative integer, got {}",
                    l
                )))
            }
        };
        let offset = match offset {
            -1 | 0 => 0,
            o if o > 0 => o as u64,
            o => {
                return Err(CoreError::invalid_shape(format!(
                    "offset must be 0 or a positive integer, got {}",
                    o
                )))
            }
        };
        Ok(Page { offset, limit })
    }

    /// Applies the page to an already ordered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

/// Structured search input. Every field is optional; `types` matches "any of".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

/// A search request after boundary resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    FreeText(String),
    Filter(CreatureFilter),
}

impl SearchQuery {
    /// Resolves the loosely typed `query` payload: a string is free text, an
    /// object is a filter, anything else is rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CoreError> {
        match value {
            serde_json::Value::String(text) => Ok(SearchQuery::FreeText(text.clone())),
            serde_json::Value::Object(_) => serde_json::from_value(value.clone())
                .map(SearchQuery::Filter)
                .map_err(|e| CoreError::invalid_shape(format!("invalid search filter: {}", e))),
            other => Err(CoreError::invalid_shape(format!(
                "query must be a string or an object, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn to_predicate(&self) -> SearchPredicate {
        match self {
            SearchQuery::FreeText(text) => SearchPredicate {
                name: non_empty(Some(text)),
                description: non_empty(Some(text)),
                species: non_empty(Some(text)),
                types: Vec::new(),
            },
            SearchQuery::Filter(filter) => SearchPredicate {
                name: non_empty(filter.name.as_ref()),
                description: non_empty(filter.description.as_ref()),
                species: non_empty(filter.species.as_ref()),
                types: filter
                    .types
                    .iter()
                    .flatten()
                    .filter(|t| !t.is_empty())
                    .cloned()
                    .collect(),
            },
        }
    }
}

/// The normalised search clauses. Present clauses are combined with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPredicate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub species: Option<String>,
    pub types: Vec<String>,
}

impl SearchPredicate {
    /// A predicate without clauses matches nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.species.is_none()
            && self.types.is_empty()
    }

    /// Evaluates the predicate against already projected fields. Used by
    /// in-process graph engines; Neo4j evaluates the compiled `WHERE` instead.
    pub fn matches(&self, name: &str, description: &str, species: &str, types: &[String]) -> bool {
        let contains = |clause: &Option<String>, field: &str| {
            clause.as_deref().map_or(false, |needle| field.contains(needle))
        };
        contains(&self.name, name)
            || contains(&self.description, description)
            || contains(&self.species, species)
            || types.iter().any(|t| self.types.contains(t))
    }
}

/// Builds the statements behind listing and search.
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn list(page: Page) -> GraphStatement {
        GraphStatement::Creatures { predicate: None, page }
    }

    pub fn search(query: &SearchQuery, page: Page) -> GraphStatement {
        GraphStatement::Creatures {
            predicate: Some(query.to_predicate()),
            page,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
