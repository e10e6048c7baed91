//! Single-flight refresh orchestration: acquire-or-wait, mint, atomic handoff, poll-and-read.
//!
//! [`RefreshCoordinator::refresh`] coordinates concurrent requests that carry the same
//! refresh token so only one authority round-trip happens per distinct token. The race
//! is decided by the store's atomic conditional set; the winner mints and publishes the
//! pair with a transactional cache-write + lease-delete, while every loser polls the
//! lease and reads the cached result once it clears. All coordination state lives in the
//! external store, so coordinator instances scale horizontally with no shared memory.

mod metrics;

pub use metrics::CoordinatorMetrics;

// crates.io
use tokio::time::{Instant, sleep};
// self
use crate::{
	_prelude::*,
	auth::{Subject, TokenPair},
	authority::TokenAuthority,
	lock::{LockKey, LockManager},
	obs::{self, RefreshOutcome, RefreshPath, RefreshSpan},
	store::{AtomicOp, KvStore, StoreError},
};

/// Timing knobs for the single-flight protocol.
///
/// The cached result deliberately shares the lease TTL, giving losers a grace window
/// exactly as long as the lease itself; a very slow poller can still miss a cache entry
/// that expires together with the lease and will surface [`Error::CacheMiss`]. Neither
/// default is validated against real contention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
	/// Lease TTL; also bounds the waiters' poll loop and the cache grace window.
	pub lock_ttl: Duration,
	/// Fixed sleep between lease probes on the waiter path.
	pub poll_interval: Duration,
}
impl CoordinatorConfig {
	/// Default lease TTL.
	pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(5);
	/// Default waiter poll interval.
	pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

	/// Overrides the lease TTL; a zero duration falls back to the default.
	pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
		self.lock_ttl = if ttl.is_zero() { Self::DEFAULT_LOCK_TTL } else { ttl };

		self
	}

	/// Overrides the poll interval; a zero duration falls back to the default.
	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval =
			if interval.is_zero() { Self::DEFAULT_POLL_INTERVAL } else { interval };

		self
	}
}
impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self { lock_ttl: Self::DEFAULT_LOCK_TTL, poll_interval: Self::DEFAULT_POLL_INTERVAL }
	}
}

/// Inbound refresh request: `{"refresh_token": "..."}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
	/// Raw refresh token supplied by the caller, if any.
	#[serde(default)]
	pub refresh_token: Option<String>,
}
impl RefreshRequest {
	/// Builds a request carrying the provided token.
	pub fn new(refresh_token: impl Into<String>) -> Self {
		Self { refresh_token: Some(refresh_token.into()) }
	}

	/// Parses a raw JSON request body, reporting the failing path on malformed input.
	pub fn from_json(raw: &str) -> Result<Self> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|err| Error::InvalidRequest { reason: err.to_string() })
	}

	fn token(&self) -> Result<&str> {
		match self.refresh_token.as_deref() {
			Some(token) if !token.trim().is_empty() => Ok(token),
			_ => Err(Error::InvalidRequest {
				reason: "Request body is missing a refresh_token.".into(),
			}),
		}
	}
}

/// Orchestrates the single-flight refresh protocol over an injected store and authority.
#[derive(Clone)]
pub struct RefreshCoordinator {
	store: Arc<dyn KvStore>,
	authority: Arc<dyn TokenAuthority>,
	locks: LockManager,
	config: CoordinatorConfig,
	metrics: Arc<CoordinatorMetrics>,
}
impl RefreshCoordinator {
	/// Creates a coordinator over the provided store and token authority.
	pub fn new(
		store: Arc<dyn KvStore>,
		authority: Arc<dyn TokenAuthority>,
		config: CoordinatorConfig,
	) -> Self {
		let locks = LockManager::new(store.clone(), config.lock_ttl);

		Self { store, authority, locks, config, metrics: Default::default() }
	}

	/// Returns the shared outcome counters.
	pub fn metrics(&self) -> &CoordinatorMetrics {
		&self.metrics
	}

	/// Parses a raw JSON request body and runs [`RefreshCoordinator::refresh`].
	pub async fn refresh_json(&self, raw: &str) -> Result<TokenPair> {
		self.refresh(RefreshRequest::from_json(raw)?).await
	}

	/// Refreshes the token pair for the request, deduplicating concurrent callers.
	///
	/// Exactly one concurrent caller per distinct token reaches the authority's mint
	/// operation; the rest receive the same pair from the result cache. Dropping the
	/// returned future while polling stops promptly and leaves store state untouched,
	/// since waiters never hold the lease.
	pub async fn refresh(&self, request: RefreshRequest) -> Result<TokenPair> {
		let span = RefreshSpan::new("refresh");

		obs::record_refresh_outcome(RefreshOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.metrics.record_attempt();

				let token = request.token().inspect_err(|_| self.metrics.record_failure())?;
				let subject = self.authority.verify(token).await.map_err(|err| {
					self.metrics.record_failure();

					Error::from(err)
				})?;
				let key = LockManager::derive_key(token);
				let won = self
					.locks
					.try_acquire(&key)
					.await
					.inspect_err(|_| self.metrics.record_failure())?;

				if won {
					obs::record_refresh_path(RefreshPath::Winner);

					self.mint_and_publish(&key, &subject)
						.await
						.inspect_err(|_| self.metrics.record_failure())
				} else {
					obs::record_refresh_path(RefreshPath::Waiter);

					self.await_cached(&key).await.inspect_err(|_| self.metrics.record_failure())
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_refresh_outcome(RefreshOutcome::Success),
			Err(_) => obs::record_refresh_outcome(RefreshOutcome::Failure),
		}

		result
	}

	/// Winner path: mint through the authority, then publish the result and clear the
	/// lease as one transactional batch so no observer ever sees the lease gone while
	/// the cache is still unpopulated.
	async fn mint_and_publish(&self, key: &LockKey, subject: &Subject) -> Result<TokenPair> {
		let pair = match self.authority.mint(subject).await {
			Ok(pair) => pair,
			Err(err) => {
				// Waiters must not starve; TTL expiry backs up a failed delete.
				let _ = self.locks.release(key).await;

				return Err(err.into());
			},
		};
		let payload = match serde_json::to_string(&pair) {
			Ok(payload) => payload,
			Err(err) => {
				let _ = self.locks.release(key).await;

				return Err(StoreError::Serialization { message: err.to_string() }.into());
			},
		};
		let ops = vec![
			AtomicOp::SetWithTtl {
				key: key.cache_key().into(),
				value: payload,
				ttl_secs: self.locks.ttl_secs(),
			},
			AtomicOp::Delete { key: key.clone().into() },
		];

		if let Err(err) = self.store.execute_atomic(ops).await {
			let _ = self.locks.release(key).await;

			return Err(err.into());
		}

		self.metrics.record_minted();

		Ok(pair)
	}

	/// Waiter path: poll the lease until it clears, bounded by the lease TTL, then read
	/// the winner's cached pair.
	async fn await_cached(&self, key: &LockKey) -> Result<TokenPair> {
		let started = Instant::now();

		while self.locks.exists(key).await? {
			let waited = started.elapsed();

			if waited >= self.config.lock_ttl {
				// The winner is presumed crashed or stalled; its lease will expire.
				return Err(Error::LockTimeout { waited_secs: waited.as_secs() });
			}

			sleep(self.config.poll_interval).await;
		}

		let payload = self.store.get(key.cache_key().as_str()).await?.ok_or(Error::CacheMiss)?;
		let pair = serde_json::from_str(&payload)
			.map_err(|err| StoreError::Serialization { message: err.to_string() })?;

		self.metrics.record_cache_hit();

		Ok(pair)
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("locks", &self.locks)
			.field("config", &self.config)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn config_defaults_match_the_protocol_constants() {
		let config = CoordinatorConfig::default();

		assert_eq!(config.lock_ttl, Duration::from_secs(5));
		assert_eq!(config.poll_interval, Duration::from_millis(100));
	}

	#[test]
	fn zero_overrides_fall_back_to_defaults() {
		let config = CoordinatorConfig::default()
			.with_lock_ttl(Duration::ZERO)
			.with_poll_interval(Duration::ZERO);

		assert_eq!(config, CoordinatorConfig::default());

		let tuned = CoordinatorConfig::default()
			.with_lock_ttl(Duration::from_secs(30))
			.with_poll_interval(Duration::from_millis(25));

		assert_eq!(tuned.lock_ttl, Duration::from_secs(30));
		assert_eq!(tuned.poll_interval, Duration::from_millis(25));
	}

	#[test]
	fn request_parsing_reports_malformed_bodies() {
		let parsed = RefreshRequest::from_json("{\"refresh_token\":\"tok-A\"}")
			.expect("Well-formed body should parse.");

		assert_eq!(parsed.refresh_token.as_deref(), Some("tok-A"));

		let empty = RefreshRequest::from_json("{}").expect("Empty object should parse.");

		assert!(empty.refresh_token.is_none());
		assert!(matches!(empty.token(), Err(Error::InvalidRequest { .. })));

		let type_error = RefreshRequest::from_json("{\"refresh_token\":42}")
			.expect_err("Numeric token should be rejected.");

		assert!(matches!(&type_error, Error::InvalidRequest { reason } if reason.contains("refresh_token")));

		let garbage = RefreshRequest::from_json("not json")
			.expect_err("Non-JSON body should be rejected.");

		assert_eq!(garbage.code(), "invalid_request");
	}

	#[test]
	fn blank_tokens_are_rejected() {
		let request = RefreshRequest::new("   ");

		assert!(matches!(request.token(), Err(Error::InvalidRequest { .. })));
		assert_eq!(RefreshRequest::new("tok-A").token().expect("Token should be accepted."), "tok-A");
	}
}
