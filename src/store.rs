//! Key-value store contract and built-in backends for leases and cached refresh results.

pub mod memory;
#[cfg(feature = "redis")] pub mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")] pub use redis::RedisStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`KvStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Expiring key-value store contract consumed by the coordinator.
///
/// Five primitives are all the protocol requires: an atomic conditional set, point
/// reads, an existence probe, an idempotent delete, and a transactional batch that can
/// at least pair a set with a delete. The conditional set is the sole serialization
/// point of the whole system; backends must guarantee it is a single atomic operation,
/// never a check followed by a set.
pub trait KvStore
where
	Self: Send + Sync,
{
	/// Stores `value` under `key` with the provided TTL iff the key is currently absent.
	///
	/// Returns `true` iff this call created the entry. Never blocks on contention.
	fn set_if_absent<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl_secs: u64,
	) -> StoreFuture<'a, bool>;

	/// Fetches the live value stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Non-blocking probe for a live entry under `key`.
	fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool>;

	/// Deletes the entry under `key`. Deleting an absent key is not an error.
	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

	/// Applies the batch transactionally: either every operation takes effect or none,
	/// and no concurrent observer sees a partially applied batch.
	fn execute_atomic(&self, ops: Vec<AtomicOp>) -> StoreFuture<'_, ()>;
}

/// Single operation inside a [`KvStore::execute_atomic`] batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomicOp {
	/// Unconditionally stores `value` under `key` with the provided TTL.
	SetWithTtl {
		/// Target key.
		key: String,
		/// Value to store.
		value: String,
		/// Entry lifetime in seconds.
		ttl_secs: u64,
	},
	/// Deletes the entry under `key`.
	Delete {
		/// Target key.
		key: String,
	},
}

/// Error type produced by [`KvStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding or decoding stored values.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
