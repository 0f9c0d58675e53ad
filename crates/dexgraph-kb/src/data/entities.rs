//! View objects returned by the core

use serde::{Deserialize, Serialize};

use crate::data::identifiers::CreatureId;

/// A creature projected from the graph.
///
/// `species` comes from the `Is` relation and `types` from `Has`; neither is a
/// stored property of the creature node. The order of `types` follows the
/// engine's traversal order and is not guaranteed to be stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hires: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub sprite: String,
    #[serde(default)]
    pub types: Vec<String>,
}
