//! Core data structures for the creature graph

pub mod types;
pub mod identifiers;
pub mod trace_context;
pub mod entities;
pub mod errors;

pub use types::{DataPacket, GraphRow};
pub use identifiers::{creature_ids, CreatureId};
pub use trace_context::TraceContext;
pub use errors::{CoreError, StateStoreError};
pub use entities::Creature;
