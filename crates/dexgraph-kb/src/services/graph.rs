//! Shared graph access for the core services

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::data::{GraphRow, StateStoreError, TraceContext};
use crate::services::query::GraphStatement;
use crate::traits::{GraphSession, GraphSessionProvider};

/// Default upper bound for a single statement.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Injected session provider plus the per-statement time bound.
#[derive(Clone)]
pub struct GraphAccess {
    provider: Arc<dyn GraphSessionProvider>,
    query_timeout: Duration,
}

impl GraphAccess {
    pub fn new(provider: Arc<dyn GraphSessionProvider>, query_timeout: Duration) -> Self {
        Self {
            provider,
            query_timeout,
        }
    }

    /// Opens a session scoped to the caller; it is released when dropped.
    pub async fn open(&self, trace_ctx: &TraceContext) -> Result<BoundedSession, StateStoreError> {
        let session = self.provider.open_session(trace_ctx).await?;
        Ok(BoundedSession {
            inner: session,
            query_timeout: self.query_timeout,
            trace_id: trace_ctx.trace_id.clone(),
        })
    }

    /// Opens a session, runs a single statement and releases the session.
    pub async fn run_once(
        &self,
        trace_ctx: &TraceContext,
        statement: &GraphStatement,
    ) -> Result<Vec<GraphRow>, StateStoreError> {
        let mut session = self.open(trace_ctx).await?;
        session.run(statement).await
    }
}

/// A session whose statements are each bounded by the query timeout.
pub struct BoundedSession {
    inner: Box<dyn GraphSession>,
    query_timeout: Duration,
    trace_id: String,
}

impl BoundedSession {
    pub async fn run(&mut self, statement: &GraphStatement) -> Result<Vec<GraphRow>, StateStoreError> {
        debug!(
            trace_id = %self.trace_id,
            statement = statement.name(),
            "Running graph statement"
        );
        match tokio::time::timeout(self.query_timeout, self.inner.run(statement)).await {
            Ok(result) => result,
            Err(_) => Err(StateStoreError::Timeout(self.query_timeout)),
        }
    }
}
