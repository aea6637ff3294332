//! File-based status-check storage.
//!
//! Stores records as JSONL at `{database_dir}/status_checks.jsonl`.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

use crate::api::StatusCheck;
use crate::config::StoreLocation;
use crate::store::error::{StorageError, StorageResult};
use crate::store::status::StatusCheckStore;

const COLLECTION_FILE: &str = "status_checks.jsonl";

/// Bytes read per step when scanning the collection from its end.
const TAIL_CHUNK: u64 = 64 * 1024;

/// File-based implementation of [`StatusCheckStore`].
#[derive(Clone)]
pub struct FileStatusStore {
    database_dir: PathBuf,
    /// Serializes appends and reads of the single collection file.
    lock: Arc<Mutex<()>>,
}

impl FileStatusStore {
    pub fn new(database_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_dir: database_dir.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn at(location: &StoreLocation) -> Self {
        Self::new(location.database_dir())
    }

    /// Create the database directory if needed.
    pub async fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.database_dir)
            .await
            .map_err(|e| StorageError::file_io(&self.database_dir, e))
    }

    fn collection_path(&self) -> PathBuf {
        self.database_dir.join(COLLECTION_FILE)
    }
}

#[async_trait]
impl StatusCheckStore for FileStatusStore {
    async fn insert(&self, check: &StatusCheck) -> StorageResult<()> {
        let _guard = self.lock.lock().await;

        self.ensure_dir().await?;
        let path = self.collection_path();

        let mut line =
            serde_json::to_string(check).map_err(|e| StorageError::serialization(e.to_string()))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;

        file.flush()
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;

        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> StorageResult<Vec<StatusCheck>> {
        let _guard = self.lock.lock().await;
        let path = self.collection_path();

        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::file_io(&path, e)),
        };
        let len = file
            .metadata()
            .await
            .map_err(|e| StorageError::file_io(&path, e))?
            .len();

        // Read backwards a chunk at a time until `limit` records are complete.
        let mut pos = len;
        let mut tail: Vec<u8> = Vec::new();
        loop {
            let step = TAIL_CHUNK.min(pos);
            pos -= step;

            let mut chunk = vec![0u8; step as usize];
            file.seek(SeekFrom::Start(pos))
                .await
                .map_err(|e| StorageError::file_io(&path, e))?;
            file.read_exact(&mut chunk)
                .await
                .map_err(|e| StorageError::file_io(&path, e))?;
            chunk.extend_from_slice(&tail);
            tail = chunk;

            let (mut checks, corrupt) = parse_lines(&tail, pos == 0);
            if pos == 0 || checks.len() >= limit {
                if corrupt > 0 {
                    warn!(path = %path.display(), corrupt, "Skipped corrupt status checks");
                }
                let start = checks.len().saturating_sub(limit);
                return Ok(checks.split_off(start));
            }
        }
    }
}

/// Parse complete JSONL records in `buf`, returning them with the number of
/// lines that failed to parse. Unless `from_start`, the first line may be cut
/// off and is ignored.
fn parse_lines(buf: &[u8], from_start: bool) -> (Vec<StatusCheck>, usize) {
    let mut lines = buf.split(|b| *b == b'\n');
    if !from_start {
        lines.next();
    }

    let mut corrupt = 0;
    let checks = lines
        .filter(|line| !line.trim_ascii().is_empty())
        .filter_map(|line| match serde_json::from_slice(line) {
            Ok(check) => Some(check),
            Err(_) => {
                corrupt += 1;
                None
            }
        })
        .collect();
    (checks, corrupt)
}
