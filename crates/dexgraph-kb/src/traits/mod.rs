//! Core traits (interfaces) for the creature graph

pub mod graph_session;

pub use graph_session::{GraphSession, GraphSessionProvider};

#[cfg(test)]
pub use graph_session::MockGraphSessionProvider;
