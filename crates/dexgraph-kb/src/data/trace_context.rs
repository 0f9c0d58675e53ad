//! Request correlation for graph statements and log lines

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlates everything a single request does against the creature graph.
///
/// A battle resolution fans out into concurrent effectiveness checks; each of
/// them runs under a child context so their statements can be told apart while
/// still sharing the request's `trace_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    pub parent_id: Option<String>,
}

impl TraceContext {
    /// Creates a new root trace context with a fresh trace_id and span_id.
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            span_id: Uuid::new_v4().to_string(),
            parent_id: None,
        }
    }

    /// Creates a child context that keeps the trace_id but gets its own span_id.
    pub fn new_child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: Uuid::new_v4().to_string(),
            parent_id: Some(self.span_id.clone()),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new_root()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trace_id, self.span_id)
    }
}
