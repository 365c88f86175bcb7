use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;

use super::{ResultStore, StorageError};
use crate::services::checker::CheckResult;

/// Process-local result store used when no database is configured.
///
/// Response times are truncated to whole milliseconds on the way in so reads
/// look the same as rows coming back from `check_results`.
pub struct MemoryResultStore {
    results: RwLock<Vec<CheckResult>>,
    capacity: usize,
}

impl MemoryResultStore {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Oldest rows are evicted once `capacity` is reached
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }

    fn as_stored(result: &CheckResult) -> CheckResult {
        let mut stored = result.clone();
        stored.response_time = Duration::from_millis(result.response_time_ms());
        stored
    }

    fn evict(&self, rows: &mut Vec<CheckResult>) {
        if rows.len() > self.capacity {
            let excess = rows.len() - self.capacity;
            rows.drain(..excess);
        }
    }
}

impl Default for MemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn save(&self, result: &CheckResult) -> Result<(), StorageError> {
        let mut rows = self.results.write().await;
        rows.push(Self::as_stored(result));
        self.evict(&mut rows);
        Ok(())
    }

    async fn save_batch(&self, results: &[CheckResult]) -> Result<(), StorageError> {
        let mut rows = self.results.write().await;
        rows.extend(results.iter().map(Self::as_stored));
        self.evict(&mut rows);
        Ok(())
    }

    async fn query_recent(&self, url: &str, limit: u32) -> Result<Vec<CheckResult>, StorageError> {
        let rows = self.results.read().await;
        let mut matching: Vec<CheckResult> = rows.iter().filter(|r| r.url == url).cloned().collect();
        // Stable sort keeps insertion order for equal timestamps; reverse it too
        matching.reverse();
        matching.sort_by(|a, b| b.checked_at.cmp(&a.checked_at));
        matching.truncate(limit as usize);
        Ok(matching)
    }
}
