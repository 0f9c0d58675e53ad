//! Adapters for external graph engines

pub mod neo4j_store;

pub use neo4j_store::{Neo4jSession, Neo4jSessionProvider};
