use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::types::Insight;

#[derive(Default)]
struct CacheState {
    /// Bumped on every invalidation
    generation: u64,
    entry: Option<(Instant, Vec<Insight>)>,
}

/// Most recent insight batch, served again while younger than the TTL.
pub struct InsightCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl InsightCache {
    /// A zero TTL disables caching
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub async fn get(&self) -> Option<Vec<Insight>> {
        if self.ttl.is_zero() {
            return None;
        }

        let state = self.state.read().await;
        match &state.entry {
            Some((stored_at, insights)) if stored_at.elapsed() < self.ttl => Some(insights.clone()),
            _ => None,
        }
    }

    /// Token to hand back to `put`; read it before snapshotting the endpoints.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Store a batch computed at `generation`. Dropped if the cache was
    /// invalidated since, so a stale endpoint set is never served.
    pub async fn put(&self, generation: u64, insights: Vec<Insight>) {
        if self.ttl.is_zero() {
            return;
        }

        let mut state = self.state.write().await;
        if state.generation == generation {
            state.entry = Some((Instant::now(), insights));
        }
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.generation = state.generation.wrapping_add(1);
        state.entry = None;
    }
}
