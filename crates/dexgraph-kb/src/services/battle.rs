//! Slot-by-slot battle resolution

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::data::{CoreError, CreatureId, TraceContext};
use crate::services::effectiveness::EffectivenessResolver;

/// Outcome of a single slot, serialized as `1`, `0` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum SlotOutcome {
    TeamB = -1,
    Neutral = 0,
    TeamA = 1,
}

impl SlotOutcome {
    /// Mutual or absent advantage is neutral.
    pub fn from_effectiveness(a_beats_b: bool, b_beats_a: bool) -> Self {
        match (a_beats_b, b_beats_a) {
            (true, false) => SlotOutcome::TeamA,
            (false, true) => SlotOutcome::TeamB,
            _ => SlotOutcome::Neutral,
        }
    }

    pub fn value(self) -> i8 {
        self as i8
    }
}

impl From<SlotOutcome> for i8 {
    fn from(outcome: SlotOutcome) -> Self {
        outcome.value()
    }
}

impl TryFrom<i8> for SlotOutcome {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(SlotOutcome::TeamB),
            0 => Ok(SlotOutcome::Neutral),
            1 => Ok(SlotOutcome::TeamA),
            other => Err(format!("slot outcome out of range: {}", other)),
        }
    }
}

/// Aggregate result of a battle, derived from its slot outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
    Draw,
}

impl Winner {
    pub fn from_outcomes(outcomes: &[SlotOutcome]) -> Self {
        let score: i32 = outcomes.iter().map(|o| i32::from(o.value())).sum();
        match score {
            s if s > 0 => Winner::A,
            s if s < 0 => Winner::B,
            _ => Winner::Draw,
        }
    }
}

/// Compares two equal-length teams slot by slot.
#[derive(Clone)]
pub struct BattleSimulator {
    resolver: EffectivenessResolver,
}

impl BattleSimulator {
    pub fn new(resolver: EffectivenessResolver) -> Self {
        Self { resolver }
    }

    /// Resolves every slot concurrently. The result is ordered by slot index.
    ///
    /// A length mismatch fails before any graph session is opened. A failed
    /// effectiveness check counts as "not effective" for that direction.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn resolve(
        &self,
        trace_ctx: &TraceContext,
        team_a: &[CreatureId],
        team_b: &[CreatureId],
    ) -> Result<Vec<SlotOutcome>, CoreError> {
        if team_a.len() != team_b.len() {
            warn!(team_a = team_a.len(), team_b = team_b.len(), "Rejecting uneven teams");
            return Err(CoreError::InvalidTeamComposition {
                team_a: team_a.len(),
                team_b: team_b.len(),
            });
        }

        let slots = team_a
            .iter()
            .zip(team_b)
            .enumerate()
            .map(|(slot, (&a, &b))| self.resolve_slot(trace_ctx, slot, a, b));
        let outcomes = join_all(slots).await;

        debug!(?outcomes, "Battle resolved");
        Ok(outcomes)
    }

    async fn resolve_slot(
        &self,
        trace_ctx: &TraceContext,
        slot: usize,
        a: CreatureId,
        b: CreatureId,
    ) -> SlotOutcome {
        let forward_ctx = TraceContext::new_child(trace_ctx);
        let backward_ctx = TraceContext::new_child(trace_ctx);
        let (forward, backward) = tokio::join!(
            self.check(&forward_ctx, slot, a, b),
            self.check(&backward_ctx, slot, b, a),
        );
        SlotOutcome::from_effectiveness(forward, backward)
    }

    async fn check(
        &self,
        trace_ctx: &TraceContext,
        slot: usize,
        attacker: CreatureId,
        defender: CreatureId,
    ) -> bool {
        match self.resolver.is_effective(trace_ctx, attacker, defender).await {
            Ok(effective) => effective,
            Err(e) => {
                warn!(slot, %attacker, %defender, error = %e, "Effectiveness check failed, treating as not effective");
                false
            }
        }
    }
}
