//! Controllable wall clock

use async_trait::async_trait;
use jotter_core::effects::PhysicalTimeEffects;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fixed: 2022-01-01 00:00:00 UTC
pub const DEFAULT_TEST_TIME_MS: u64 = 1_640_995_200_000;

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock reading `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    /// Current reading
    pub fn now(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to `now_ms`
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_TIME_MS)
    }
}

#[async_trait]
impl PhysicalTimeEffects for ManualClock {
    async fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
