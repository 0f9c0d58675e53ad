//! Error types for the creature graph core

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the query/rule layer.
///
/// Only `InvalidTeamComposition` and `InvalidQueryShape` ever reach a caller of
/// [`PokedexService`](crate::services::PokedexService); `DataUnavailable` is logged
/// and converted into an empty answer there.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Creature graph unavailable: {0}")]
    DataUnavailable(#[from] StateStoreError),

    #[error("Invalid team composition: team A has {team_a} creatures, team B has {team_b}")]
    InvalidTeamComposition { team_a: usize, team_b: usize },

    #[error("Invalid query shape: {0}")]
    InvalidQueryShape(String),
}

impl CoreError {
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        CoreError::InvalidQueryShape(message.into())
    }

    /// True for failures that the fail-soft contract swallows.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, CoreError::DataUnavailable(_))
    }
}

/// Failures talking to the graph engine.
#[derive(Error, Debug)]
pub enum StateStoreError {
    #[error("Graph database connection error: {0}")]
    ConnectionError(String),
    #[error("Graph query execution error: {0}")]
    QueryError(String),
    #[error("Data mapping error from graph result: {0}")]
    MappingError(String),
    #[error("Graph statement timed out after {0:?}")]
    Timeout(Duration),
}
