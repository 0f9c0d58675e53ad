//! In-memory battle log
//!
//! Used when no log file is configured, and in tests. Everything is lost when
//! the last handle is dropped.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{BattleFilter, BattleLog, BattleLogResult, BattleRecord, RecordPage};

#[derive(Debug, Clone, Default)]
pub struct InMemoryBattleLog {
    records: Arc<RwLock<Vec<BattleRecord>>>,
}

impl InMemoryBattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BattleLog for InMemoryBattleLog {
    async fn append(&self, record: &BattleRecord) -> BattleLogResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find(&self, filter: &BattleFilter, page: RecordPage) -> BattleLogResult<Vec<BattleRecord>> {
        let records = self.records.read().await;
        Ok(page.apply(records.iter().filter(|r| filter.matches(r)).cloned()))
    }
}
