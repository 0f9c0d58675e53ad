//! Runtime configuration
//!
//! Values come from the process environment, after loading `.env` if present.
//! A value that fails to parse is reported and the default is kept.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::services::graph::DEFAULT_QUERY_TIMEOUT;

/// Connection settings for the graph engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: Option<String>,
    pub pool_size: usize,
    pub connection_retry_count: u32,
    pub connection_retry_delay: Duration,
    pub query_timeout: Duration,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "neo4j://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            database: None,
            pool_size: 10,
            connection_retry_count: 3,
            connection_retry_delay: Duration::from_secs(2),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// Everything the API server needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexConfig {
    pub neo4j: Neo4jConfig,
    /// JSON-lines battle log; `None` keeps battles in memory.
    pub battle_log_path: Option<PathBuf>,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            neo4j: Neo4jConfig::default(),
            battle_log_path: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
        }
    }
}

impl DexConfig {
    /// Loads `.env` and reads the environment.
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let neo4j = &mut config.neo4j;

        if let Some(uri) = lookup("NEO4J_URI") {
            neo4j.uri = uri;
        }
        if let Some(username) = lookup("NEO4J_USERNAME") {
            neo4j.username = username;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            neo4j.password = password;
        }
        neo4j.database = lookup("NEO4J_DATABASE").filter(|db| !db.is_empty());
        parse_into(&lookup, "NEO4J_POOL_SIZE", &mut neo4j.pool_size);
        parse_into(&lookup, "NEO4J_CONNECTION_RETRY_COUNT", &mut neo4j.connection_retry_count);

        let mut retry_delay_secs = neo4j.connection_retry_delay.as_secs();
        parse_into(&lookup, "NEO4J_CONNECTION_RETRY_DELAY_SECS", &mut retry_delay_secs);
        neo4j.connection_retry_delay = Duration::from_secs(retry_delay_secs);

        let mut query_timeout_secs = neo4j.query_timeout.as_secs();
        parse_into(&lookup, "NEO4J_QUERY_TIMEOUT_SECS", &mut query_timeout_secs);
        if query_timeout_secs == 0 {
            warn!("NEO4J_QUERY_TIMEOUT_SECS must be positive, keeping {:?}", DEFAULT_QUERY_TIMEOUT);
            query_timeout_secs = DEFAULT_QUERY_TIMEOUT.as_secs();
        }
        neo4j.query_timeout = Duration::from_secs(query_timeout_secs);

        config.battle_log_path = lookup("BATTLE_LOG_PATH")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        if let Some(host) = lookup("SERVER_HOST") {
            config.server_host = host;
        }
        parse_into(&lookup, "SERVER_PORT", &mut config.server_port);

        config
    }
}

fn parse_into<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => warn!("Invalid {} value: {}", key, raw),
        }
    }
}
