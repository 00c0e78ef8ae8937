//! Credential-pair models and the redacting token secret wrapper.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access/refresh credential pair owned by a session store.
///
/// A pair is minted whole by a login exchange, its access token is replaced on every
/// successful refresh, and the pair is destroyed on logout. At most one pair is current
/// per session store.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential attached to individual API calls.
	pub access_token: TokenSecret,
	/// Longer-lived credential used exclusively to obtain new access tokens.
	pub refresh_token: TokenSecret,
	/// Instant the pair was minted by the login exchange.
	pub issued_at: OffsetDateTime,
	/// Instant of the most recent access-token rotation, if any.
	pub rotated_at: Option<OffsetDateTime>,
}
impl CredentialPair {
	/// Creates a pair stamped with the current instant.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			issued_at: OffsetDateTime::now_utc(),
			rotated_at: None,
		}
	}

	/// Overrides the issued-at instant.
	pub fn with_issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Replaces the access token after a successful refresh, keeping the refresh token.
	pub fn rotate_access(&mut self, token: TokenSecret, instant: OffsetDateTime) {
		self.access_token = token;
		self.rotated_at = Some(instant);
	}

	/// Age of the pair relative to the provided instant.
	pub fn age_at(&self, instant: OffsetDateTime) -> Duration {
		instant - self.issued_at
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("rotated_at", &self.rotated_at)
			.finish()
	}
}
