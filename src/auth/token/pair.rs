//! Immutable token pair minted by the token authority.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token type stamped on every minted pair.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Access/refresh token pair returned to every caller of a refresh cycle.
///
/// The serde shape is the wire contract: `{refresh_token, access_token, expires_in,
/// token_type}`. The pair is immutable once minted; the coordinator serializes it into
/// the result cache and into the response and retains nothing afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Rotated refresh token to be used for the next refresh cycle.
	pub refresh_token: TokenSecret,
	/// Short-lived access token.
	pub access_token: TokenSecret,
	/// Access token lifetime in seconds.
	pub expires_in: u64,
	/// OAuth token type; always [`TOKEN_TYPE_BEARER`].
	pub token_type: String,
}
impl TokenPair {
	/// Creates a bearer token pair.
	pub fn new(
		refresh_token: impl Into<TokenSecret>,
		access_token: impl Into<TokenSecret>,
		expires_in: u64,
	) -> Self {
		Self {
			refresh_token: refresh_token.into(),
			access_token: access_token.into(),
			expires_in,
			token_type: TOKEN_TYPE_BEARER.into(),
		}
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("refresh_token", &"<redacted>")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("token_type", &self.token_type)
			.finish()
	}
}
