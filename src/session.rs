//! Session contracts and built-in session store implementations for credential pairs.

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

// self
use crate::{
	_prelude::*,
	credential::{CredentialPair, TokenSecret},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SessionError>> + 'a + Send>>;

/// Storage backend contract implemented by session stores.
///
/// At most one credential pair is current at any time; every accessor observes the
/// latest rotation, never a value captured before one.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the full credential pair, if a session is active.
	fn credentials(&self) -> SessionFuture<'_, Option<CredentialPair>>;

	/// Returns the current access token, if a session is active.
	fn access_token(&self) -> SessionFuture<'_, Option<TokenSecret>>;

	/// Returns the current refresh token, if a session is active.
	fn refresh_token(&self) -> SessionFuture<'_, Option<TokenSecret>>;

	/// Installs a freshly minted credential pair, replacing any previous session.
	fn install(&self, pair: CredentialPair) -> SessionFuture<'_, ()>;

	/// Replaces the access token of the installed pair after a successful refresh.
	fn rotate_access_token(&self, token: TokenSecret) -> SessionFuture<'_, ()>;

	/// Destroys the session on logout or irrecoverable refresh failure.
	fn clear(&self) -> SessionFuture<'_, ()>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionError {
	/// Serialization failures surfaced by the backend.
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
	/// Rotation was attempted while no credential pair was installed.
	#[error("No credential pair is installed in the session.")]
	NoActiveSession,
}
