//! An in-memory creature graph for tests
//!
//! Implements [`GraphSessionProvider`] by evaluating each [`GraphStatement`]
//! variant directly over seeded data, producing rows with the same columns the
//! Neo4j adapter returns. Sessions and statements are counted so tests can
//! check that every session is released, and failures can be injected.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::data::{Creature, CreatureId, DataPacket, GraphRow, StateStoreError, TraceContext};
use crate::services::query::GraphStatement;
use crate::traits::{GraphSession, GraphSessionProvider};

#[derive(Debug, Default)]
struct GraphData {
    creatures: Vec<Creature>,
    evolutions: Vec<(CreatureId, CreatureId)>,
    effective: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct GraphState {
    data: RwLock<GraphData>,
    sessions_opened: AtomicUsize,
    sessions_released: AtomicUsize,
    statements_run: AtomicUsize,
    fail_statements: AtomicBool,
    fail_open_session: AtomicBool,
    statement_delay: RwLock<Option<Duration>>,
}

/// Shared handle to an in-memory graph; clones see the same data and counters.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraph {
    state: Arc<GraphState>,
}

/// Builds a creature with empty asset fields.
pub fn creature(id: i64, name: &str, species: &str, types: &[&str]) -> Creature {
    Creature {
        id: CreatureId(id),
        name: name.to_string(),
        species: species.to_string(),
        description: String::new(),
        hires: String::new(),
        thumbnail: String::new(),
        sprite: String::new(),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a creature. An empty species means the creature has no `Is` edge,
    /// which hides it from every creature-returning statement.
    pub fn add_creature(&self, creature: Creature) -> &Self {
        self.state.data.write().creatures.push(creature);
        self
    }

    pub fn add_evolution(&self, from: i64, to: i64) -> &Self {
        self.state
            .data
            .write()
            .evolutions
            .push((CreatureId(from), CreatureId(to)));
        self
    }

    pub fn add_effective(&self, attacking: &str, defending: &str) -> &Self {
        self.state
            .data
            .write()
            .effective
            .push((attacking.to_string(), defending.to_string()));
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn sessions_released(&self) -> usize {
        self.state.sessions_released.load(Ordering::SeqCst)
    }

    /// Sessions opened but not yet dropped.
    pub fn open_sessions(&self) -> usize {
        self.sessions_opened() - self.sessions_released()
    }

    pub fn statements_run(&self) -> usize {
        self.state.statements_run.load(Ordering::SeqCst)
    }

    /// Makes every statement fail with a query error.
    pub fn fail_statements(&self, fail: bool) {
        self.state.fail_statements.store(fail, Ordering::SeqCst);
    }

    /// Makes opening a session fail with a connection error.
    pub fn fail_open_session(&self, fail: bool) {
        self.state.fail_open_session.store(fail, Ordering::SeqCst);
    }

    /// Delays every statement, for exercising timeouts.
    pub fn set_statement_delay(&self, delay: Option<Duration>) {
        *self.state.statement_delay.write() = delay;
    }
}

#[async_trait]
impl GraphSessionProvider for InMemoryGraph {
    async fn open_session(
        &self,
        _trace_ctx: &TraceContext,
    ) -> Result<Box<dyn GraphSession>, StateStoreError> {
        if self.state.fail_open_session.load(Ordering::SeqCst) {
            return Err(StateStoreError::ConnectionError(
                "in-memory graph refused the session".to_string(),
            ));
        }
        self.state.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemorySession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct InMemorySession {
    state: Arc<GraphState>,
}

#[async_trait]
impl GraphSession for InMemorySession {
    async fn run(&mut self, statement: &GraphStatement) -> Result<Vec<GraphRow>, StateStoreError> {
        self.state.statements_run.fetch_add(1, Ordering::SeqCst);

        let delay = *self.state.statement_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.state.fail_statements.load(Ordering::SeqCst) {
            return Err(StateStoreError::QueryError(format!(
                "injected failure for {}",
                statement.name()
            )));
        }

        let data = self.state.data.read();
        Ok(evaluate(&data, statement))
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        self.state.sessions_released.fetch_add(1, Ordering::SeqCst);
    }
}

fn evaluate(data: &GraphData, statement: &GraphStatement) -> Vec<GraphRow> {
    // Creatures without a species have no `Is` edge and never match
    let creatures = data.creatures.iter().filter(|c| !c.species.is_empty());

    match statement {
        GraphStatement::Creatures { predicate, page } => {
            let matched = creatures.filter(|c| {
                predicate.as_ref().map_or(true, |p| {
                    p.matches(&c.name, &c.description, &c.species, &c.types)
                })
            });
            page.apply(matched).into_iter().map(creature_row).collect()
        }
        GraphStatement::CreaturesById { ids } => {
            let ids: HashSet<_> = ids.iter().collect();
            creatures
                .filter(|c| ids.contains(&c.id))
                .map(creature_row)
                .collect()
        }
        GraphStatement::EvolvesInto { ids } => data
            .evolutions
            .iter()
            .filter(|(from, _)| ids.contains(from))
            .map(|(from, to)| {
                GraphRow::from([
                    ("source".to_string(), DataPacket::Integer(from.get())),
                    ("target".to_string(), DataPacket::Integer(to.get())),
                ])
            })
            .collect(),
        GraphStatement::TypesOf { ids } => data
            .creatures
            .iter()
            .filter(|c| ids.contains(&c.id))
            .flat_map(|c| {
                c.types.iter().map(move |t| {
                    GraphRow::from([
                        ("id".to_string(), DataPacket::Integer(c.id.get())),
                        ("type".to_string(), DataPacket::from(t.as_str())),
                    ])
                })
            })
            .collect(),
        GraphStatement::EffectiveBetween { attacking, defending } => data
            .effective
            .iter()
            .filter(|(a, d)| attacking.contains(a) && defending.contains(d))
            .map(effective_row)
            .collect(),
        GraphStatement::EffectiveChart => data.effective.iter().map(effective_row).collect(),
        GraphStatement::CreaturesWithTypes { types } => creatures
            .filter(|c| c.types.iter().any(|t| types.contains(t)))
            .map(creature_row)
            .collect(),
    }
}

fn creature_row(creature: &Creature) -> GraphRow {
    GraphRow::from([
        ("id".to_string(), DataPacket::Integer(creature.id.get())),
        ("name".to_string(), DataPacket::from(creature.name.as_str())),
        ("description".to_string(), DataPacket::from(creature.description.as_str())),
        ("hires".to_string(), DataPacket::from(creature.hires.as_str())),
        ("thumbnail".to_string(), DataPacket::from(creature.thumbnail.as_str())),
        ("sprite".to_string(), DataPacket::from(creature.sprite.as_str())),
        ("species".to_string(), DataPacket::from(creature.species.as_str())),
        ("types".to_string(), DataPacket::from(creature.types.clone())),
    ])
}

fn effective_row((attacking, defending): &(String, String)) -> GraphRow {
    GraphRow::from([
        ("attacking".to_string(), DataPacket::from(attacking.as_str())),
        ("defending".to_string(), DataPacket::from(defending.as_str())),
    ])
}
