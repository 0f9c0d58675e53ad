//! Evolution-chain traversal

use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

use crate::data::{CoreError, Creature, CreatureId, TraceContext};
use crate::services::graph::GraphAccess;
use crate::services::query::{projection, GraphStatement};

/// Walks `Evolution_Next` breadth-first from a creature.
///
/// Each hop is one statement over the whole frontier, so a chain of depth `d`
/// costs `d + 1` statements plus one to enrich the descendants. Every creature
/// is visited once, which keeps the walk finite on cyclic data.
pub struct EvolutionTraversal {
    graph: GraphAccess,
}

impl EvolutionTraversal {
    pub fn new(graph: GraphAccess) -> Self {
        Self { graph }
    }

    /// Returns every descendant of `id`, excluding `id` itself, nearest first.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id, creature = %id))]
    pub async fn descendants(
        &self,
        trace_ctx: &TraceContext,
        id: CreatureId,
    ) -> Result<Vec<Creature>, CoreError> {
        let mut session = self.graph.open(trace_ctx).await?;

        let mut visited = HashSet::from([id]);
        let mut discovered = Vec::new();
        let mut frontier = vec![id];

        while !frontier.is_empty() {
            let rows = session
                .run(&GraphStatement::EvolvesInto { ids: frontier })
                .await?;

            let mut next = Vec::new();
            for row in &rows {
                let target = CreatureId(projection::required_i64(row, "target")?);
                if visited.insert(target) {
                    next.push(target);
                }
            }
            discovered.extend(next.iter().copied());
            frontier = next;
        }

        if discovered.is_empty() {
            debug!("Creature has no descendants");
            return Ok(Vec::new());
        }

        let rows = session
            .run(&GraphStatement::CreaturesById { ids: discovered.clone() })
            .await?;
        let mut by_id: HashMap<CreatureId, Creature> = projection::creatures_from_rows(&rows)?
            .into_iter()
            .map(|creature| (creature.id, creature))
            .collect();

        let chain: Vec<Creature> = discovered
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        debug!(count = chain.len(), "Resolved evolution chain");
        Ok(chain)
    }
}
