use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::config::Neo4jConfig;
use crate::data::{DataPacket, GraphRow, StateStoreError, TraceContext};
use crate::services::query::{ColumnKind, GraphStatement};
use crate::traits::{GraphSession, GraphSessionProvider};

/// Process-wide Neo4j connection pool exposed as a session provider.
pub struct Neo4jSessionProvider {
    graph: Arc<Graph>,
}

impl Neo4jSessionProvider {
    /// Connects to Neo4j, retrying `connection_retry_count` times, and checks
    /// the connection with a trivial statement before handing it out.
    pub async fn connect(config: Neo4jConfig) -> Result<Self, StateStoreError> {
        let mut config_builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .max_connections(config.pool_size);

        if let Some(db) = &config.database {
            config_builder = config_builder.db(db.as_str());
        }

        let neo4j_config = config_builder
            .build()
            .map_err(|e| StateStoreError::ConnectionError(format!("Failed to build Neo4j config: {}", e)))?;

        let attempts = config.connection_retry_count.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match Graph::connect(neo4j_config.clone()).await {
                Ok(graph) => {
                    info!("Connected to Neo4j at {} (attempt {})", config.uri, attempt);
                    match graph.execute(Query::new("RETURN 1 AS ok".to_string())).await {
                        Ok(_) => {
                            return Ok(Self {
                                graph: Arc::new(graph),
                            })
                        }
                        Err(e) => {
                            error!("Connection check failed: {}", e);
                            last_error = Some(e.to_string());
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to connect to Neo4j (attempt {}): {}", attempt, e);
                    last_error = Some(e.to_string());
                }
            }
            if attempt < attempts {
                tokio::time::sleep(config.connection_retry_delay).await;
            }
        }

        Err(StateStoreError::ConnectionError(format!(
            "Failed to connect to Neo4j after {} attempts. Last error: {}",
            attempts,
            last_error.unwrap_or_default()
        )))
    }
}

#[async_trait]
impl GraphSessionProvider for Neo4jSessionProvider {
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    async fn open_session(
        &self,
        trace_ctx: &TraceContext,
    ) -> Result<Box<dyn GraphSession>, StateStoreError> {
        debug!("Opening graph session");
        Ok(Box::new(Neo4jSession {
            graph: Arc::clone(&self.graph),
            trace_id: trace_ctx.trace_id.clone(),
            statements: 0,
        }))
    }
}

/// A read-only session scoped to one core operation.
///
/// Pool connections are borrowed per statement and returned when the result
/// stream is exhausted; dropping the session ends the scope.
pub struct Neo4jSession {
    graph: Arc<Graph>,
    trace_id: String,
    statements: usize,
}

#[async_trait]
impl GraphSession for Neo4jSession {
    async fn run(&mut self, statement: &GraphStatement) -> Result<Vec<GraphRow>, StateStoreError> {
        let text = statement.cypher();
        debug!(trace_id = %self.trace_id, statement = statement.name(), "Executing Cypher: {}", text);
        self.statements += 1;

        let mut query = Query::new(text);
        for (key, value) in statement.params() {
            query = bind_param(query, &key, value)?;
        }

        let mut result = self
            .graph
            .execute(query)
            .await
            .map_err(|e| StateStoreError::QueryError(format!("Failed to execute {}: {}", statement.name(), e)))?;

        let mut rows = Vec::new();
        loop {
            match result.next().await {
                Ok(Some(row)) => rows.push(row_to_map(&row, statement.columns())),
                Ok(None) => break,
                Err(e) => {
                    return Err(StateStoreError::QueryError(format!(
                        "Failed to read rows of {}: {}",
                        statement.name(),
                        e
                    )))
                }
            }
        }
        Ok(rows)
    }
}

impl Drop for Neo4jSession {
    fn drop(&mut self) {
        debug!(trace_id = %self.trace_id, statements = self.statements, "Released graph session");
    }
}

/// Binds one parameter. Arrays must be homogeneous text or integer lists.
fn bind_param(query: Query, key: &str, value: DataPacket) -> Result<Query, StateStoreError> {
    let query = match value {
        DataPacket::Null => query,
        DataPacket::Bool(b) => query.param(key, b),
        DataPacket::Integer(i) => query.param(key, i),
        DataPacket::Number(n) => query.param(key, n),
        DataPacket::String(s) => query.param(key, s),
        DataPacket::Array(items) => {
            if let Some(strings) = items.iter().map(|i| i.as_str().map(str::to_string)).collect::<Option<Vec<_>>>() {
                query.param(key, strings)
            } else if let Some(ints) = items.iter().map(DataPacket::as_i64).collect::<Option<Vec<_>>>() {
                query.param(key, ints)
            } else {
                return Err(StateStoreError::QueryError(format!(
                    "Parameter '{}' is not a list of text or integers",
                    key
                )));
            }
        }
    };
    Ok(query)
}

/// Reads the statement's declared columns; absent or null values become `Null`.
fn row_to_map(row: &neo4rs::Row, columns: &[(&str, ColumnKind)]) -> GraphRow {
    columns
        .iter()
        .map(|&(column, kind)| {
            let value = match kind {
                ColumnKind::Integer => row.get::<i64>(column).map(DataPacket::Integer).ok(),
                ColumnKind::Text => row.get::<String>(column).map(DataPacket::String).ok(),
                ColumnKind::TextList => row.get::<Vec<String>>(column).map(DataPacket::from).ok(),
            };
            (column.to_string(), value.unwrap_or(DataPacket::Null))
        })
        .collect()
}
