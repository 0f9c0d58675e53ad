//! JSON-lines battle log on local disk
//!
//! One record per line, appended in order. Reads scan the whole file, which is
//! fine for the volumes a single server produces.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{BattleFilter, BattleLog, BattleLogResult, BattleRecord, RecordPage};

#[derive(Debug)]
pub struct FileBattleLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBattleLog {
    /// Creates the parent directory if needed. The file itself is created on
    /// the first append.
    pub async fn open(path: impl Into<PathBuf>) -> BattleLogResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        debug!(path = %path.display(), "Opened battle log");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    async fn read_all(&self) -> BattleLogResult<Vec<BattleRecord>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<BattleRecord>(line).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl BattleLog for FileBattleLog {
    async fn append(&self, record: &BattleRecord) -> BattleLogResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn find(&self, filter: &BattleFilter, page: RecordPage) -> BattleLogResult<Vec<BattleRecord>> {
        let records = self.read_all().await?;
        Ok(page.apply(records.into_iter().filter(|r| filter.matches(r))))
    }
}
