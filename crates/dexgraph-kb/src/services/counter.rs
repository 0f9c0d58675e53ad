//! Counter selection against a creature or a team

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::data::{CoreError, Creature, CreatureId, TraceContext};
use crate::services::effectiveness::{types_by_creature, EffectivenessChart};
use crate::services::graph::GraphAccess;
use crate::services::query::{projection, GraphStatement};

/// The creature or creatures a counter is wanted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterTarget {
    Single(CreatureId),
    Many(Vec<CreatureId>),
}

impl CounterTarget {
    /// Accepts an integer id or a non-empty array of integer ids.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(|id| CounterTarget::Single(CreatureId(id)))
                .ok_or_else(|| CoreError::invalid_shape(format!("creature id must be an integer, got {}", n))),
            Value::Array(items) if items.is_empty() => {
                Err(CoreError::invalid_shape("counter target list is empty"))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_i64().map(CreatureId).ok_or_else(|| {
                        CoreError::invalid_shape(format!("creature id must be an integer, got {}", item))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(CounterTarget::Many),
            other => Err(CoreError::invalid_shape(format!(
                "counter target must be an id or a list of ids, got {}",
                other
            ))),
        }
    }

    /// The query set, de-duplicated, in input order.
    pub fn ids(&self) -> Vec<CreatureId> {
        match self {
            CounterTarget::Single(id) => vec![*id],
            CounterTarget::Many(ids) => {
                let mut seen = HashSet::new();
                ids.iter().copied().filter(|id| seen.insert(*id)).collect()
            }
        }
    }
}

impl From<CreatureId> for CounterTarget {
    fn from(id: CreatureId) -> Self {
        CounterTarget::Single(id)
    }
}

impl From<Vec<CreatureId>> for CounterTarget {
    fn from(ids: Vec<CreatureId>) -> Self {
        CounterTarget::Many(ids)
    }
}

/// Picks one member of `candidates`, each with equal probability.
pub fn choose_uniform<R: Rng + ?Sized>(candidates: &[Creature], rng: &mut R) -> Option<Creature> {
    candidates.choose(rng).cloned()
}

/// Finds creatures that beat a query set without already being beaten by it.
#[derive(Clone)]
pub struct CounterFinder {
    graph: GraphAccess,
}

impl CounterFinder {
    pub fn new(graph: GraphAccess) -> Self {
        Self { graph }
    }

    /// The full eligible pool, de-duplicated by id.
    ///
    /// A candidate owns a type with an `Effective` edge into some type of the
    /// query set. It is dropped when it belongs to the query set, or when the
    /// query set's types reach one of its types over one or more `Effective`
    /// edges. Those chains may not pass through a type that is effective
    /// against the query set, so a cyclic chart does not loop back onto the
    /// counters themselves.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn candidates(
        &self,
        trace_ctx: &TraceContext,
        target: &CounterTarget,
    ) -> Result<Vec<Creature>, CoreError> {
        let query_ids = target.ids();
        if query_ids.is_empty() {
            return Err(CoreError::invalid_shape("counter target list is empty"));
        }

        let mut session = self.graph.open(trace_ctx).await?;

        let rows = session
            .run(&GraphStatement::TypesOf { ids: query_ids.clone() })
            .await?;
        let mut grouped = types_by_creature(&rows)?;
        let mut query_types: Vec<String> = Vec::new();
        for types in query_ids.iter().filter_map(|id| grouped.remove(id)) {
            for type_name in types {
                if !query_types.contains(&type_name) {
                    query_types.push(type_name);
                }
            }
        }
        if query_types.is_empty() {
            debug!("Query set has no types, no counters");
            return Ok(Vec::new());
        }

        let rows = session.run(&GraphStatement::EffectiveChart).await?;
        let chart = EffectivenessChart::from_rows(&rows)?;

        let attackers = chart.attackers_of(&query_types);
        if attackers.is_empty() {
            debug!("Nothing is effective against the query set");
            return Ok(Vec::new());
        }
        let beaten = chart.reachable_avoiding(&query_types, &attackers);
        let mut attacking: Vec<String> = attackers.into_iter().collect();
        attacking.sort();

        let rows = session
            .run(&GraphStatement::CreaturesWithTypes { types: attacking.clone() })
            .await?;
        let excluded: HashSet<CreatureId> = query_ids.into_iter().collect();
        let mut seen = HashSet::new();
        let pool: Vec<Creature> = projection::creatures_from_rows(&rows)?
            .into_iter()
            .filter(|c| !excluded.contains(&c.id))
            .filter(|c| c.types.iter().any(|t| attacking.contains(t)))
            .filter(|c| !c.types.iter().any(|t| beaten.contains(t)))
            .filter(|c| seen.insert(c.id))
            .collect();

        debug!(
            pool = pool.len(),
            excluded_types = beaten.len(),
            "Counter candidates resolved"
        );
        Ok(pool)
    }

    /// One uniformly chosen counter, or `None` when the pool is empty.
    pub async fn find(
        &self,
        trace_ctx: &TraceContext,
        target: &CounterTarget,
    ) -> Result<Option<Creature>, CoreError> {
        let pool = self.candidates(trace_ctx, target).await?;
        Ok(choose_uniform(&pool, &mut rand::thread_rng()))
    }

    /// Same as [`CounterFinder::find`] with a caller-supplied random source.
    pub async fn find_with<R: Rng + Send + ?Sized>(
        &self,
        trace_ctx: &TraceContext,
        target: &CounterTarget,
        rng: &mut R,
    ) -> Result<Option<Creature>, CoreError> {
        let pool = self.candidates(trace_ctx, target).await?;
        Ok(choose_uniform(&pool, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn creature(id: i64) -> Creature {
        Creature {
            id: CreatureId(id),
            name: format!("creature-{}", id),
            species: String::new(),
            description: String::new(),
            hires: String::new(),
            thumbnail: String::new(),
            sprite: String::new(),
            types: Vec::new(),
        }
    }

    #[test]
    fn test_target_from_json() {
        assert_eq!(
            CounterTarget::from_json(&json!(25)).unwrap(),
            CounterTarget::Single(CreatureId(25))
        );
        assert_eq!(
            CounterTarget::from_json(&json!([1, 4, 1])).unwrap().ids(),
            vec![CreatureId(1), CreatureId(4)]
        );
    }

    #[test]
    fn test_target_rejects_other_shapes() {
        for value in [json!("25"), json!([]), json!([1, "x"]), json!({"pid": 1}), json!(2.5), json!(null)] {
            let err = CounterTarget::from_json(&value).unwrap_err();
            assert!(matches!(err, CoreError::InvalidQueryShape(_)), "accepted {}", value);
        }
    }

    #[test]
    fn test_choose_from_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(choose_uniform(&[], &mut rng).is_none());
    }

    #[test]
    fn test_choice_is_deterministic_under_a_seed() {
        let pool: Vec<Creature> = (1..=5).map(creature).collect();
        let first: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..20).map(|_| choose_uniform(&pool, &mut rng).unwrap().id).collect()
        };
        let second: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..20).map(|_| choose_uniform(&pool, &mut rng).unwrap().id).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_choice_is_uniform() {
        let pool: Vec<Creature> = (1..=3).map(creature).collect();
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 3000;
        let mut counts = [0u32; 3];
        for _ in 0..trials {
            let chosen = choose_uniform(&pool, &mut rng).unwrap();
            counts[(chosen.id.get() - 1) as usize] += 1;
        }

        let expected = trials as f64 / 3.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&observed| (observed as f64 - expected).powi(2) / expected)
            .sum();
        // df = 2, p = 0.001
        assert!(chi_square < 13.82, "chi-square {} for counts {:?}", chi_square, counts);
    }
}
