//! Test support shared by unit and integration tests

pub mod in_memory_graph;

pub use in_memory_graph::{creature, InMemoryGraph};
