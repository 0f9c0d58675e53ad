//! Session traits for read-only access to the creature graph

use async_trait::async_trait;

use crate::data::{GraphRow, StateStoreError, TraceContext};
use crate::services::query::GraphStatement;

/// A scoped, read-only session on the creature graph.
///
/// Dropping the session releases it back to its provider. Holders keep it for
/// the duration of one operation only; sessions are never reused across
/// requests.
#[async_trait]
pub trait GraphSession: Send {
    /// Runs one statement and returns its rows keyed by column alias.
    async fn run(&mut self, statement: &GraphStatement) -> Result<Vec<GraphRow>, StateStoreError>;
}

/// Hands out sessions from a connection manager that lives for the whole
/// process. The core only ever sees this capability, never the driver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphSessionProvider: Send + Sync {
    async fn open_session(
        &self,
        trace_ctx: &TraceContext,
    ) -> Result<Box<dyn GraphSession>, StateStoreError>;
}
