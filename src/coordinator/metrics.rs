// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh invocations, shared across coordinator clones.
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
	attempts: AtomicU64,
	minted: AtomicU64,
	cache_hits: AtomicU64,
	failures: AtomicU64,
}
impl CoordinatorMetrics {
	/// Returns the total number of refresh attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of winner-path completions (authority mints).
	pub fn minted(&self) -> u64 {
		self.minted.load(Ordering::Relaxed)
	}

	/// Returns the number of waiter-path completions served from the result cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh calls.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_minted(&self) {
		self.minted.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
