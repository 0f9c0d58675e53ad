//! Query and rule services over the creature graph

pub mod battle;
pub mod catalog;
pub mod counter;
pub mod effectiveness;
pub mod evolution;
pub mod graph;
pub mod pokedex;
pub mod query;

pub use battle::{BattleSimulator, SlotOutcome, Winner};
pub use catalog::CreatureCatalog;
pub use counter::{choose_uniform, CounterFinder, CounterTarget};
pub use effectiveness::{EffectivenessChart, EffectivenessResolver};
pub use evolution::EvolutionTraversal;
pub use graph::{BoundedSession, GraphAccess, DEFAULT_QUERY_TIMEOUT};
pub use pokedex::PokedexService;
pub use query::{CreatureFilter, GraphStatement, Page, QueryBuilder, SearchPredicate, SearchQuery};
