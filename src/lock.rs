//! Lease management: deterministic key derivation plus acquire/probe/release against the store.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, store::KvStore};

/// Namespace prefix applied to every lock key.
pub const LOCK_PREFIX: &str = "rt_lock:";
/// Second namespace prefix layered on top of a lock key for cached refresh results.
pub const CACHE_PREFIX: &str = "cache_";

/// Placeholder value stored under an acquired lease; only the key's presence matters.
const LEASE_VALUE: &str = "1";

/// Lease identifier derived from a refresh token.
///
/// The raw token never reaches the store: the key is the SHA-256 digest of the token
/// bytes, hex-encoded and prefixed with [`LOCK_PREFIX`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LockKey(String);
impl LockKey {
	/// Returns the key as a store-addressable string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Derives the cache key the refresh result is published under.
	pub fn cache_key(&self) -> CacheKey {
		CacheKey(format!("{CACHE_PREFIX}{}", self.0))
	}
}
impl From<LockKey> for String {
	fn from(value: LockKey) -> Self {
		value.0
	}
}
impl Display for LockKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Store key the winner publishes the serialized token pair under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);
impl CacheKey {
	/// Returns the key as a store-addressable string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl From<CacheKey> for String {
	fn from(value: CacheKey) -> Self {
		value.0
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Drives lease acquisition against the shared store.
///
/// Stateless between calls: every operation goes straight to the store, so any number
/// of manager instances across processes coordinate correctly through the store's
/// atomic conditional set.
#[derive(Clone)]
pub struct LockManager {
	store: Arc<dyn KvStore>,
	ttl: Duration,
}
impl LockManager {
	/// Creates a manager issuing leases with the provided TTL.
	pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
		Self { store, ttl }
	}

	/// Returns the lease TTL.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub(crate) fn ttl_secs(&self) -> u64 {
		self.ttl.as_secs().max(1)
	}

	/// Derives the lease key for a refresh token.
	///
	/// Pure and deterministic: the same token always yields the same key, and distinct
	/// tokens collide only with cryptographic-hash probability.
	pub fn derive_key(refresh_token: &str) -> LockKey {
		let digest = Sha256::digest(refresh_token.as_bytes());
		let mut key = String::with_capacity(LOCK_PREFIX.len() + digest.len() * 2);

		key.push_str(LOCK_PREFIX);

		for byte in digest {
			key.push_str(&format!("{byte:02x}"));
		}

		LockKey(key)
	}

	/// Attempts to create the lease; returns `true` iff this call became the holder.
	pub async fn try_acquire(&self, key: &LockKey) -> Result<bool> {
		Ok(self.store.set_if_absent(key.as_str(), LEASE_VALUE, self.ttl_secs()).await?)
	}

	/// Probes whether the lease currently exists.
	pub async fn exists(&self, key: &LockKey) -> Result<bool> {
		Ok(self.store.exists(key.as_str()).await?)
	}

	/// Releases the lease. Releasing an absent or already-expired lease is not an error.
	pub async fn release(&self, key: &LockKey) -> Result<()> {
		Ok(self.store.delete(key.as_str()).await?)
	}
}
impl Debug for LockManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LockManager").field("ttl", &self.ttl).finish()
	}
}
