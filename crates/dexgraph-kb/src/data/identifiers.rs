//! Identifier types for the creature graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a creature node (`Pokemon.id` in the graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureId(pub i64);

impl CreatureId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CreatureId {
    fn from(id: i64) -> Self {
        CreatureId(id)
    }
}

/// Converts a slice of raw ids, as they arrive in team payloads.
pub fn creature_ids(raw: &[i64]) -> Vec<CreatureId> {
    raw.iter().copied().map(CreatureId).collect()
}
