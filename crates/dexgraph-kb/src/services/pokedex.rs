//! Request-facing facade over the creature graph services

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, instrument};

use crate::data::{CoreError, Creature, CreatureId, TraceContext};
use crate::services::battle::{BattleSimulator, SlotOutcome};
use crate::services::catalog::CreatureCatalog;
use crate::services::counter::{CounterFinder, CounterTarget};
use crate::services::effectiveness::EffectivenessResolver;
use crate::services::evolution::EvolutionTraversal;
use crate::services::graph::GraphAccess;
use crate::services::query::{Page, SearchQuery};
use crate::traits::GraphSessionProvider;

/// Entry point used by the request layer.
///
/// Graph failures never escape from here: they are logged and turned into an
/// empty list, `false` or `None`. Caller mistakes (uneven teams, a counter
/// target of the wrong shape) still surface as [`CoreError`].
#[derive(Clone)]
pub struct PokedexService {
    catalog: Arc<CreatureCatalog>,
    evolution: Arc<EvolutionTraversal>,
    resolver: EffectivenessResolver,
    battles: BattleSimulator,
    counters: CounterFinder,
}

impl PokedexService {
    pub fn new(provider: Arc<dyn GraphSessionProvider>, query_timeout: Duration) -> Self {
        let graph = GraphAccess::new(provider, query_timeout);
        let resolver = EffectivenessResolver::new(graph.clone());
        Self {
            catalog: Arc::new(CreatureCatalog::new(graph.clone())),
            evolution: Arc::new(EvolutionTraversal::new(graph.clone())),
            battles: BattleSimulator::new(resolver.clone()),
            resolver,
            counters: CounterFinder::new(graph),
        }
    }

    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn list_creatures(&self, trace_ctx: &TraceContext, page: Page) -> Vec<Creature> {
        fail_soft("list_creatures", self.catalog.list(trace_ctx, page).await)
    }

    #[instrument(skip(self, trace_ctx, query), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn search_creatures(
        &self,
        trace_ctx: &TraceContext,
        query: &SearchQuery,
        page: Page,
    ) -> Vec<Creature> {
        fail_soft("search_creatures", self.catalog.search(trace_ctx, query, page).await)
    }

    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn evolution_chain(&self, trace_ctx: &TraceContext, id: CreatureId) -> Vec<Creature> {
        fail_soft("evolution_chain", self.evolution.descendants(trace_ctx, id).await)
    }

    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn is_effective(
        &self,
        trace_ctx: &TraceContext,
        attacker: CreatureId,
        defender: CreatureId,
    ) -> bool {
        fail_soft(
            "is_effective",
            self.resolver.is_effective(trace_ctx, attacker, defender).await,
        )
    }

    /// Fails only on a team length mismatch.
    pub async fn resolve_battle(
        &self,
        trace_ctx: &TraceContext,
        team_a: &[CreatureId],
        team_b: &[CreatureId],
    ) -> Result<Vec<SlotOutcome>, CoreError> {
        self.battles.resolve(trace_ctx, team_a, team_b).await
    }

    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn find_counter(
        &self,
        trace_ctx: &TraceContext,
        target: &CounterTarget,
    ) -> Result<Option<Creature>, CoreError> {
        swallow_unavailable("find_counter", self.counters.find(trace_ctx, target).await)
    }

    pub async fn find_counter_with<R: Rng + Send + ?Sized>(
        &self,
        trace_ctx: &TraceContext,
        target: &CounterTarget,
        rng: &mut R,
    ) -> Result<Option<Creature>, CoreError> {
        swallow_unavailable(
            "find_counter",
            self.counters.find_with(trace_ctx, target, rng).await,
        )
    }
}

/// Logs any failure and falls back to the empty answer.
fn fail_soft<T: Default>(operation: &str, result: Result<T, CoreError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!(operation, error = %e, "Graph operation failed, returning empty result");
            T::default()
        }
    }
}

/// Like [`fail_soft`] for `DataUnavailable` only; other errors are the caller's.
fn swallow_unavailable<T: Default>(
    operation: &str,
    result: Result<T, CoreError>,
) -> Result<T, CoreError> {
    match result {
        Err(e) if e.is_data_unavailable() => {
            error!(operation, error = %e, "Graph operation failed, returning empty result");
            Ok(T::default())
        }
        other => other,
    }
}
