//! Query and rule core for a creature graph
//!
//! Search, evolution chains, type effectiveness, battle resolution and counter
//! selection over a read-only graph of creatures, species and types.

pub mod config;
pub mod data;
pub mod services;
pub mod traits;

#[cfg(feature = "adapters")]
pub mod adapters;

pub mod test_utils;

pub use config::{DexConfig, Neo4jConfig};
pub use data::{
    CoreError, Creature, CreatureId, DataPacket, GraphRow, StateStoreError, TraceContext,
};
pub use services::{
    BattleSimulator, CounterFinder, CounterTarget, CreatureFilter, EffectivenessChart,
    EffectivenessResolver, EvolutionTraversal, GraphStatement, Page, PokedexService,
    QueryBuilder, SearchQuery, SlotOutcome, Winner, DEFAULT_QUERY_TIMEOUT,
};
pub use traits::{GraphSession, GraphSessionProvider};

#[cfg(feature = "adapters")]
pub use adapters::Neo4jSessionProvider;

/// Initialize tracing for the creature graph services
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
