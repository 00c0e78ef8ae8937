//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	credential::{CredentialPair, TokenSecret},
	session::{SessionError, SessionFuture, SessionStore},
};

type SessionSlot = Arc<RwLock<Option<CredentialPair>>>;

/// Thread-safe session backend that keeps the credential pair in-process.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionSlot);
impl MemorySessionStore {
	fn install_now(slot: SessionSlot, pair: CredentialPair) {
		*slot.write() = Some(pair);
	}

	fn rotate_now(slot: SessionSlot, token: TokenSecret) -> Result<(), SessionError> {
		match slot.write().as_mut() {
			Some(pair) => {
				pair.rotate_access(token, OffsetDateTime::now_utc());

				Ok(())
			},
			None => Err(SessionError::NoActiveSession),
		}
	}

	fn clear_now(slot: SessionSlot) {
		*slot.write() = None;
	}
}
impl SessionStore for MemorySessionStore {
	fn credentials(&self) -> SessionFuture<'_, Option<CredentialPair>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn access_token(&self) -> SessionFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().map(|pair| pair.access_token.clone())) })
	}

	fn refresh_token(&self) -> SessionFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().map(|pair| pair.refresh_token.clone())) })
	}

	fn install(&self, pair: CredentialPair) -> SessionFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			Self::install_now(slot, pair);

			Ok(())
		})
	}

	fn rotate_access_token(&self, token: TokenSecret) -> SessionFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::rotate_now(slot, token) })
	}

	fn clear(&self) -> SessionFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			Self::clear_now(slot);

			Ok(())
		})
	}
}
