//! Type-effectiveness resolution

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, instrument};

use crate::data::{CoreError, CreatureId, GraphRow, StateStoreError, TraceContext};
use crate::services::graph::GraphAccess;
use crate::services::query::{projection, GraphStatement};

/// The directed `Effective` relation between type labels.
///
/// Edges are taken as given: the chart never closes the relation
/// transitively unless asked through [`EffectivenessChart::reachable_avoiding`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivenessChart {
    edges: HashMap<String, HashSet<String>>,
}

impl EffectivenessChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut chart = Self::new();
        for (attacking, defending) in edges {
            chart.insert(attacking, defending);
        }
        chart
    }

    pub(crate) fn from_rows(rows: &[GraphRow]) -> Result<Self, StateStoreError> {
        let mut chart = Self::new();
        for row in rows {
            chart.insert(
                projection::required_str(row, "attacking")?,
                projection::required_str(row, "defending")?,
            );
        }
        Ok(chart)
    }

    pub fn insert(&mut self, attacking: impl Into<String>, defending: impl Into<String>) {
        self.edges
            .entry(attacking.into())
            .or_default()
            .insert(defending.into());
    }

    pub fn is_effective(&self, attacking: &str, defending: &str) -> bool {
        self.edges
            .get(attacking)
            .map_or(false, |targets| targets.contains(defending))
    }

    /// True iff some type in `attacking` has a direct edge to some type in `defending`.
    pub fn any_effective(&self, attacking: &[String], defending: &[String]) -> bool {
        attacking
            .iter()
            .any(|a| defending.iter().any(|d| self.is_effective(a, d)))
    }

    /// Types with a direct edge into any of `defending`.
    pub fn attackers_of(&self, defending: &[String]) -> HashSet<String> {
        self.edges
            .iter()
            .filter(|(_, targets)| defending.iter().any(|d| targets.contains(d)))
            .map(|(attacking, _)| attacking.clone())
            .collect()
    }

    /// Types reachable from `sources` through one or more edges, never stepping
    /// onto a type in `avoiding`.
    ///
    /// A path that would enter an avoided type is cut there: the avoided type is
    /// neither reported nor expanded. Sources themselves are always expanded.
    pub fn reachable_avoiding(
        &self,
        sources: &[String],
        avoiding: &HashSet<String>,
    ) -> HashSet<String> {
        let mut reached = HashSet::new();
        let mut queue: VecDeque<&str> = sources.iter().map(String::as_str).collect();

        while let Some(current) = queue.pop_front() {
            if let Some(targets) = self.edges.get(current) {
                for target in targets {
                    if avoiding.contains(target) {
                        continue;
                    }
                    if reached.insert(target.clone()) {
                        queue.push_back(target);
                    }
                }
            }
        }
        reached
    }
}

/// Decides whether one creature has a type advantage over another.
#[derive(Clone)]
pub struct EffectivenessResolver {
    graph: GraphAccess,
}

impl EffectivenessResolver {
    pub fn new(graph: GraphAccess) -> Self {
        Self { graph }
    }

    /// True iff some type of `attacker` has a direct `Effective` edge to some
    /// type of `defender`. Unknown creatures and empty type sets are simply not
    /// effective.
    #[instrument(
        skip(self, trace_ctx),
        fields(trace_id = %trace_ctx.trace_id, attacker = %attacker, defender = %defender)
    )]
    pub async fn is_effective(
        &self,
        trace_ctx: &TraceContext,
        attacker: CreatureId,
        defender: CreatureId,
    ) -> Result<bool, CoreError> {
        let mut session = self.graph.open(trace_ctx).await?;

        let ids = if attacker == defender {
            vec![attacker]
        } else {
            vec![attacker, defender]
        };
        let rows = session.run(&GraphStatement::TypesOf { ids }).await?;
        let types = types_by_creature(&rows)?;

        let attacking = types.get(&attacker).cloned().unwrap_or_default();
        let defending = types.get(&defender).cloned().unwrap_or_default();
        if attacking.is_empty() || defending.is_empty() {
            debug!("Missing type data, not effective");
            return Ok(false);
        }

        let rows = session
            .run(&GraphStatement::EffectiveBetween {
                attacking: attacking.clone(),
                defending: defending.clone(),
            })
            .await?;
        // Re-check the rows against the requested sets rather than trusting the engine's filter
        let chart = EffectivenessChart::from_rows(&rows)?;
        let effective = chart.any_effective(&attacking, &defending);
        debug!(effective, "Resolved effectiveness");
        Ok(effective)
    }
}

/// Groups `(id, type)` rows by creature, keeping the engine's type order.
pub(crate) fn types_by_creature(
    rows: &[GraphRow],
) -> Result<HashMap<CreatureId, Vec<String>>, StateStoreError> {
    let mut grouped: HashMap<CreatureId, Vec<String>> = HashMap::new();
    for row in rows {
        let id = CreatureId(projection::required_i64(row, "id")?);
        let type_name = projection::required_str(row, "type")?.to_string();
        let types = grouped.entry(id).or_default();
        if !types.contains(&type_name) {
            types.push(type_name);
        }
    }
    Ok(grouped)
}
