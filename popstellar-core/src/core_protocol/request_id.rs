//! JSON-RPC request ids

use std::sync::atomic::{AtomicI64, Ordering};

/// Default bound after which ids wrap back to 1
pub const DEFAULT_ID_WRAP: i64 = 10_000;

/// Hands out request ids in `[1, wrap)`, wrapping around
///
/// Safe to share between tasks.
#[derive(Debug)]
pub struct RequestIdGenerator {
    next: AtomicI64,
    wrap: i64,
}

impl RequestIdGenerator {
    /// `wrap` values below 2 are raised to 2
    pub fn new(wrap: i64) -> Self {
        RequestIdGenerator {
            next: AtomicI64::new(1),
            wrap: wrap.max(2),
        }
    }

    /// Next id
    pub fn next_id(&self) -> i64 {
        let wrap = self.wrap;
        let (Ok(id) | Err(id)) = self.next.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
            Some(if cur + 1 >= wrap { 1 } else { cur + 1 })
        });
        id
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_WRAP)
    }
}
