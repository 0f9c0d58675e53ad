//! dexgraph battle log
//!
//! Battle records are immutable once written: a log only appends and answers
//! filtered reads. [`BattleLogGateway`] is the face the request layer talks to;
//! it never fails, it reports `false` or an empty list and logs the cause.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument};

pub mod file;
pub mod memory;

pub use file::FileBattleLog;
pub use memory::InMemoryBattleLog;

/// A finished battle as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub date: DateTime<Utc>,
    pub player_a: String,
    pub player_b: String,
    pub team_a: Vec<i64>,
    pub team_b: Vec<i64>,
    /// Per-slot outcome: `1` for A, `-1` for B, `0` neutral.
    #[serde(alias = "resultado")]
    pub result: Vec<i8>,
    pub winner: String,
}

/// Exact-match filter; absent fields match anything, present fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleFilter {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub player_a: Option<String>,
    #[serde(default)]
    pub player_b: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
}

impl BattleFilter {
    pub fn matches(&self, record: &BattleRecord) -> bool {
        self.date.map_or(true, |date| record.date == date)
            && self.player_a.as_ref().map_or(true, |p| &record.player_a == p)
            && self.player_b.as_ref().map_or(true, |p| &record.player_b == p)
            && self.winner.as_ref().map_or(true, |w| &record.winner == w)
    }
}

/// Skip/limit over insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordPage {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl RecordPage {
    pub fn all() -> Self {
        Self::default()
    }

    /// `limit = -1` is unbounded and `offset = 0` (or `-1`) skips nothing.
    pub fn from_raw(limit: i64, offset: i64) -> Result<Self, BattleLogError> {
        let limit = match limit {
            -1 => None,
            l if l >= 0 => Some(l as u64),
            l => return Err(BattleLogError::InvalidPage(format!("limit {}", l))),
        };
        let offset = match offset {
            -1 | 0 => 0,
            o if o > 0 => o as u64,
            o => return Err(BattleLogError::InvalidPage(format!("offset {}", o))),
        };
        Ok(Self { offset, limit })
    }

    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

#[derive(Error, Debug)]
pub enum BattleLogError {
    #[error("Battle log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Battle log backend error: {0}")]
    Backend(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),
}

pub type BattleLogResult<T> = Result<T, BattleLogError>;

/// Storage for battle records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BattleLog: Send + Sync + std::fmt::Debug {
    /// Appends one record; records are never updated afterwards.
    async fn append(&self, record: &BattleRecord) -> BattleLogResult<()>;

    /// Matching records in insertion order, then skip/limit.
    async fn find(&self, filter: &BattleFilter, page: RecordPage) -> BattleLogResult<Vec<BattleRecord>>;
}

/// Fail-soft access to a [`BattleLog`].
#[derive(Debug, Clone)]
pub struct BattleLogGateway {
    log: Arc<dyn BattleLog>,
}

impl BattleLogGateway {
    pub fn new(log: Arc<dyn BattleLog>) -> Self {
        Self { log }
    }

    /// True once the record is stored.
    #[instrument(skip(self, record), fields(player_a = %record.player_a, player_b = %record.player_b))]
    pub async fn save_battle_record(&self, record: &BattleRecord) -> bool {
        match self.log.append(record).await {
            Ok(()) => {
                debug!("Battle record saved");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to save battle record");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn query_battle_records(&self, filter: &BattleFilter, page: RecordPage) -> Vec<BattleRecord> {
        match self.log.find(filter, page).await {
            Ok(records) => {
                debug!(count = records.len(), "Battle records found");
                records
            }
            Err(e) => {
                error!(error = %e, "Failed to query battle records");
                Vec::new()
            }
        }
    }
}
