//! Redis-backed [`KvStore`] for multi-instance deployments.

// crates.io
use redis::{
	AsyncCommands, Client, ExistenceCheck, RedisError, SetExpiry, SetOptions,
	aio::ConnectionManager,
};
// self
use crate::{
	_prelude::*,
	store::{AtomicOp, KvStore, StoreError, StoreFuture},
};

/// Production store backend speaking to a Redis-compatible server.
///
/// Built on [`ConnectionManager`] so connections reconnect automatically and clone
/// cheaply into each boxed operation future. The conditional set maps to `SET NX EX`,
/// the existence probe to `EXISTS`, and atomic batches to a `MULTI`/`EXEC` pipeline.
/// The composition root owns construction and injects the store; nothing here reads
/// ambient global state.
#[derive(Clone)]
pub struct RedisStore {
	manager: ConnectionManager,
}
impl RedisStore {
	/// Connects to the server at `url` (e.g. `redis://127.0.0.1:6379`).
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let client = Client::open(url).map_err(map_redis_error)?;
		let manager = ConnectionManager::new(client).await.map_err(map_redis_error)?;

		Ok(Self { manager })
	}

	/// Wraps an already-established connection manager.
	pub fn with_manager(manager: ConnectionManager) -> Self {
		Self { manager }
	}
}
impl KvStore for RedisStore {
	fn set_if_absent<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl_secs: u64,
	) -> StoreFuture<'a, bool> {
		let mut conn = self.manager.clone();

		Box::pin(async move {
			let options = SetOptions::default()
				.conditional_set(ExistenceCheck::NX)
				.with_expiration(SetExpiry::EX(ttl_secs));
			// Redis replies OK on success and nil when the key already exists.
			let reply: Option<String> =
				conn.set_options(key, value, options).await.map_err(map_redis_error)?;

			Ok(reply.is_some())
		})
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let mut conn = self.manager.clone();

		Box::pin(async move { conn.get(key).await.map_err(map_redis_error) })
	}

	fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
		let mut conn = self.manager.clone();

		Box::pin(async move { conn.exists(key).await.map_err(map_redis_error) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		let mut conn = self.manager.clone();

		Box::pin(async move { conn.del::<_, ()>(key).await.map_err(map_redis_error) })
	}

	fn execute_atomic(&self, ops: Vec<AtomicOp>) -> StoreFuture<'_, ()> {
		let mut conn = self.manager.clone();

		Box::pin(async move {
			let mut pipe = redis::pipe();

			pipe.atomic();

			for op in &ops {
				match op {
					AtomicOp::SetWithTtl { key, value, ttl_secs } => {
						pipe.set_ex(key, value, *ttl_secs).ignore();
					},
					AtomicOp::Delete { key } => {
						pipe.del(key).ignore();
					},
				}
			}

			pipe.query_async::<()>(&mut conn).await.map_err(map_redis_error)
		})
	}
}
impl Debug for RedisStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RedisStore(..)")
	}
}

fn map_redis_error(err: RedisError) -> StoreError {
	StoreError::Backend { message: err.to_string() }
}
