//! Token authority contract: the external collaborator that verifies refresh tokens and mints
//! replacement pairs.

// self
use crate::{
	_prelude::*,
	auth::{Subject, TokenPair},
};

/// Boxed future returned by [`TokenAuthority`] operations.
pub type AuthorityFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, AuthorityError>> + 'a + Send>>;

/// External authority that validates refresh tokens and mints new token pairs.
///
/// The coordinator treats implementations as a black box with a single contract:
/// a valid token resolves to a [`Subject`], and a subject resolves to a fresh
/// [`TokenPair`]. Cryptographic validation and token generation live entirely behind
/// this seam. Implementations must be shareable across concurrent refresh invocations.
pub trait TokenAuthority
where
	Self: Send + Sync,
{
	/// Validates a refresh token and resolves the subject it was issued to.
	fn verify<'a>(&'a self, refresh_token: &'a str) -> AuthorityFuture<'a, Subject>;

	/// Mints a new token pair for the verified subject.
	fn mint<'a>(&'a self, subject: &'a Subject) -> AuthorityFuture<'a, TokenPair>;
}

/// Error type produced by [`TokenAuthority`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthorityError {
	/// The refresh token is malformed or unrecognized; never retried.
	#[error("Authority rejected the refresh token: {reason}.")]
	InvalidToken {
		/// Authority-supplied reason string.
		reason: String,
	},
	/// The authority failed transiently; safe to retry.
	#[error("Authority is unavailable: {message}.")]
	Unavailable {
		/// Authority-supplied message summarizing the failure.
		message: String,
	},
}
impl From<AuthorityError> for Error {
	fn from(value: AuthorityError) -> Self {
		match value {
			AuthorityError::InvalidToken { reason } => Error::InvalidRequest { reason },
			AuthorityError::Unavailable { message } => Error::AuthorityUnavailable { message },
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authority_errors_map_onto_the_taxonomy() {
		let invalid: Error = AuthorityError::InvalidToken { reason: "unknown token".into() }.into();

		assert!(matches!(invalid, Error::InvalidRequest { .. }));
		assert_eq!(invalid.code(), "invalid_request");

		let unavailable: Error =
			AuthorityError::Unavailable { message: "connection refused".into() }.into();

		assert!(matches!(unavailable, Error::AuthorityUnavailable { .. }));
		assert!(unavailable.is_retryable());
	}
}
