//! Thread-safe in-memory [`KvStore`] with per-entry expiry, for local development and tests.

// crates.io
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	store::{AtomicOp, KvStore, StoreFuture},
};

#[derive(Clone, Debug)]
struct Entry {
	value: String,
	expires_at: Instant,
}
impl Entry {
	fn is_live(&self, now: Instant) -> bool {
		now < self.expires_at
	}
}

type StoreMap = Arc<RwLock<HashMap<String, Entry>>>;

/// Mutex-protected map with expiry instants, substituting for a hosted store in tests and demos.
///
/// Expired entries are treated as absent everywhere and pruned lazily on reads and
/// writes. The write lock spanning [`KvStore::execute_atomic`] batches gives the same
/// no-partial-observation guarantee a hosted store's transaction would. Timing uses
/// [`tokio::time::Instant`], so paused-clock tests drive expiry deterministically.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Counts live entries, ignoring any that expired but have not been pruned yet.
	pub fn len(&self) -> usize {
		let now = Instant::now();

		self.0.read().values().filter(|entry| entry.is_live(now)).count()
	}

	/// Returns `true` when no live entries remain.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn set_if_absent_now(map: StoreMap, key: String, value: String, ttl_secs: u64) -> bool {
		let now = Instant::now();
		let mut guard = map.write();

		if guard.get(&key).is_some_and(|entry| entry.is_live(now)) {
			return false;
		}

		guard.insert(key, Entry { value, expires_at: now + Duration::from_secs(ttl_secs) });

		true
	}

	fn get_now(map: StoreMap, key: String) -> Option<String> {
		let now = Instant::now();
		let mut guard = map.write();

		match guard.get(&key) {
			Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
			Some(_) => {
				guard.remove(&key);

				None
			},
			None => None,
		}
	}

	fn exists_now(map: StoreMap, key: String) -> bool {
		let now = Instant::now();

		map.read().get(&key).is_some_and(|entry| entry.is_live(now))
	}

	fn delete_now(map: StoreMap, key: String) {
		map.write().remove(&key);
	}

	fn execute_atomic_now(map: StoreMap, ops: Vec<AtomicOp>) {
		let now = Instant::now();
		// One write guard across the whole batch keeps it invisible until complete.
		let mut guard = map.write();

		for op in ops {
			match op {
				AtomicOp::SetWithTtl { key, value, ttl_secs } => {
					guard.insert(
						key,
						Entry { value, expires_at: now + Duration::from_secs(ttl_secs) },
					);
				},
				AtomicOp::Delete { key } => {
					guard.remove(&key);
				},
			}
		}
	}
}
impl KvStore for MemoryStore {
	fn set_if_absent<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl_secs: u64,
	) -> StoreFuture<'a, bool> {
		let map = self.0.clone();
		let key = key.to_owned();
		let value = value.to_owned();

		Box::pin(async move { Ok(Self::set_if_absent_now(map, key, value, ttl_secs)) })
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::exists_now(map, key)) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move {
			Self::delete_now(map, key);

			Ok(())
		})
	}

	fn execute_atomic(&self, ops: Vec<AtomicOp>) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::execute_atomic_now(map, ops);

			Ok(())
		})
	}
}
