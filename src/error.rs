//! Coordinator-level error taxonomy and the wire-facing error body.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical coordinator error exposed by public APIs.
///
/// Every wait path in the crate is bounded by the lease TTL, so no variant ever
/// represents an indefinite hang; [`Error::is_retryable`] tells callers whether
/// resubmitting the request can succeed.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Key-value store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),

	/// Missing/malformed refresh token, or the authority rejected it outright.
	#[error("Invalid refresh request: {reason}.")]
	InvalidRequest {
		/// Parser- or authority-supplied reason string.
		reason: String,
	},
	/// Token authority failed transiently while minting on the winner path.
	#[error("Token authority is unavailable: {message}.")]
	AuthorityUnavailable {
		/// Authority-supplied message summarizing the failure.
		message: String,
	},
	/// A waiter's bounded poll exceeded the lease TTL without observing release.
	#[error("Timed out after {waited_secs} seconds waiting for the lease to clear.")]
	LockTimeout {
		/// Whole seconds spent polling before giving up.
		waited_secs: u64,
	},
	/// Lease cleared but no cached token pair was found within the grace window.
	#[error("Lease cleared but no cached token pair was found.")]
	CacheMiss,
}
impl Error {
	/// Returns the stable wire error code for this failure.
	pub const fn code(&self) -> &'static str {
		match self {
			Error::Storage(_) => "server_error",
			Error::InvalidRequest { .. } => "invalid_request",
			Error::AuthorityUnavailable { .. } => "authority_unavailable",
			Error::LockTimeout { .. } => "lock_timeout",
			Error::CacheMiss => "cache_miss",
		}
	}

	/// Returns the HTTP-style status an embedding service should respond with.
	pub const fn http_status(&self) -> u16 {
		match self {
			Error::Storage(_) => 500,
			Error::InvalidRequest { .. } => 400,
			Error::AuthorityUnavailable { .. } => 502,
			Error::LockTimeout { .. } | Error::CacheMiss => 503,
		}
	}

	/// Returns `true` when resubmitting the same request can succeed.
	///
	/// A timed-out waiter, for example, will likely win the lease itself on retry
	/// because the stalled winner's lease has expired by then.
	pub const fn is_retryable(&self) -> bool {
		!matches!(self, Error::InvalidRequest { .. })
	}
}

/// Wire-facing failure body: `{error, error_description}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Stable error code from the taxonomy (`invalid_request`, `lock_timeout`, ...).
	pub error: String,
	/// Human-readable description of the failure.
	pub error_description: String,
}
impl From<&Error> for ErrorBody {
	fn from(value: &Error) -> Self {
		Self { error: value.code().into(), error_description: value.to_string() }
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "store unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("store unreachable"));

		let source = StdError::source(&error)
			.expect("Coordinator error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn codes_statuses_and_retryability_line_up() {
		let invalid = Error::InvalidRequest { reason: "missing refresh_token".into() };

		assert_eq!(invalid.code(), "invalid_request");
		assert_eq!(invalid.http_status(), 400);
		assert!(!invalid.is_retryable());

		let unavailable = Error::AuthorityUnavailable { message: "upstream 502".into() };

		assert_eq!(unavailable.code(), "authority_unavailable");
		assert_eq!(unavailable.http_status(), 502);
		assert!(unavailable.is_retryable());

		let timeout = Error::LockTimeout { waited_secs: 5 };

		assert_eq!(timeout.code(), "lock_timeout");
		assert_eq!(timeout.http_status(), 503);
		assert!(timeout.is_retryable());
		assert_eq!(Error::CacheMiss.http_status(), 503);
		assert!(Error::CacheMiss.is_retryable());
	}

	#[test]
	fn error_body_matches_wire_shape() {
		let error = Error::InvalidRequest { reason: "missing refresh_token".into() };
		let body = ErrorBody::from(&error);
		let payload =
			serde_json::to_string(&body).expect("Error body should serialize to JSON.");

		assert!(payload.starts_with("{\"error\":\"invalid_request\""));
		assert!(payload.contains("\"error_description\":"));
	}
}
