//! Single-flight OAuth 2.0 refresh coordination—deduplicate concurrent token refreshes through a
//! TTL key-value store with lease-based locking.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authority;
pub mod coordinator;
pub mod error;
pub mod lock;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures for unit and integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicU64, Ordering};
	// self
	use crate::{
		auth::{Subject, TokenPair},
		authority::{AuthorityError, AuthorityFuture, TokenAuthority},
		coordinator::{CoordinatorConfig, RefreshCoordinator},
		store::{KvStore, MemoryStore},
	};

	/// Scriptable [`TokenAuthority`] that counts mint calls and can be told to stall or fail.
	#[derive(Debug)]
	pub struct MockAuthority {
		subject: Subject,
		mint_calls: AtomicU64,
		fail_mint: bool,
		mint_delay: Duration,
	}
	impl MockAuthority {
		/// Creates an authority that resolves every well-formed token to `subject`.
		pub fn new(subject: &str) -> Self {
			Self {
				subject: Subject::new(subject)
					.expect("Subject fixture should be valid for mock authority."),
				mint_calls: AtomicU64::new(0),
				fail_mint: false,
				mint_delay: Duration::ZERO,
			}
		}

		/// Makes every mint call sleep for `delay` before resolving, so concurrent callers
		/// reliably overlap with the winner's in-flight mint.
		pub fn with_mint_delay(mut self, delay: Duration) -> Self {
			self.mint_delay = delay;

			self
		}

		/// Makes every mint call fail with [`AuthorityError::Unavailable`].
		pub fn with_mint_failure(mut self) -> Self {
			self.fail_mint = true;

			self
		}

		/// Returns how many mint calls reached this authority.
		pub fn mint_calls(&self) -> u64 {
			self.mint_calls.load(Ordering::SeqCst)
		}
	}
	impl TokenAuthority for MockAuthority {
		fn verify<'a>(&'a self, refresh_token: &'a str) -> AuthorityFuture<'a, Subject> {
			let outcome = if refresh_token.starts_with("bad-") {
				Err(AuthorityError::InvalidToken {
					reason: "Refresh token is not recognized.".into(),
				})
			} else {
				Ok(self.subject.clone())
			};

			Box::pin(async move { outcome })
		}

		fn mint<'a>(&'a self, subject: &'a Subject) -> AuthorityFuture<'a, TokenPair> {
			Box::pin(async move {
				if !self.mint_delay.is_zero() {
					tokio::time::sleep(self.mint_delay).await;
				}
				if self.fail_mint {
					return Err(AuthorityError::Unavailable {
						message: "Mint endpoint is down.".into(),
					});
				}

				let serial = self.mint_calls.fetch_add(1, Ordering::SeqCst) + 1;

				Ok(TokenPair::new(
					format!("refresh-{subject}-{serial}"),
					format!("access-{subject}-{serial}"),
					3_600,
				))
			})
		}
	}

	/// Constructs a [`RefreshCoordinator`] backed by an in-memory store and the provided mock
	/// authority, returning the store so tests can inspect lease and cache state.
	pub fn build_memory_coordinator(
		authority: Arc<MockAuthority>,
		config: CoordinatorConfig,
	) -> (RefreshCoordinator, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn KvStore> = store_backend.clone();
		let coordinator = RefreshCoordinator::new(store, authority, config);

		(coordinator, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use oauth2_singleflight as _;
