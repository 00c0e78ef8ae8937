//! Simple file-backed [`SessionStore`] for lightweight deployments and CLIs.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	credential::{CredentialPair, TokenSecret},
	session::{SessionError, SessionFuture, SessionStore},
};

/// Persists the credential pair to a JSON snapshot after each mutation.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<CredentialPair>>>,
}
impl FileSessionStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { None };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<Option<CredentialPair>, SessionError> {
		if !path.exists() {
			return Ok(None);
		}

		let metadata = path.metadata().map_err(|e| SessionError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| SessionError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| SessionError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), SessionError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| SessionError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &Option<CredentialPair>) -> Result<(), SessionError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| SessionError::Serialization {
				message: format!("Failed to serialize session snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| SessionError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| SessionError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| SessionError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| SessionError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl SessionStore for FileSessionStore {
	fn credentials(&self) -> SessionFuture<'_, Option<CredentialPair>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn access_token(&self) -> SessionFuture<'_, Option<TokenSecret>> {
		Box::pin(async move {
			Ok(self.inner.read().as_ref().map(|pair| pair.access_token.clone()))
		})
	}

	fn refresh_token(&self) -> SessionFuture<'_, Option<TokenSecret>> {
		Box::pin(async move {
			Ok(self.inner.read().as_ref().map(|pair| pair.refresh_token.clone()))
		})
	}

	fn install(&self, pair: CredentialPair) -> SessionFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			*guard = Some(pair);
			self.persist_locked(&guard)
		})
	}

	fn rotate_access_token(&self, token: TokenSecret) -> SessionFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			match guard.as_mut() {
				Some(pair) => {
					pair.rotate_access(token, OffsetDateTime::now_utc());
					self.persist_locked(&guard)
				},
				None => Err(SessionError::NoActiveSession),
			}
		})
	}

	fn clear(&self) -> SessionFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			*guard = None;
			self.persist_locked(&guard)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"bearer_gateway_session_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn install_and_reload_round_trip() {
		let path = temp_path();
		let store = FileSessionStore::open(&path).expect("Failed to open session snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.install(CredentialPair::new("access-1", "refresh-1")))
			.expect("Failed to install fixture pair into file store.");
		drop(store);

		let reopened = FileSessionStore::open(&path).expect("Failed to reopen session snapshot.");
		let pair = rt
			.block_on(reopened.credentials())
			.expect("Failed to fetch credential pair from file store.")
			.expect("File store lost the credential pair after reopen.");

		assert_eq!(pair.access_token.expose(), "access-1");
		assert_eq!(pair.refresh_token.expose(), "refresh-1");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary session snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn rotation_persists_and_clear_empties_the_snapshot() {
		let path = temp_path();
		let store = FileSessionStore::open(&path).expect("Failed to open session snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.install(CredentialPair::new("access-old", "refresh-1")))
			.expect("Failed to install fixture pair into file store.");
		rt.block_on(store.rotate_access_token(TokenSecret::new("access-new")))
			.expect("Failed to rotate access token in file store.");

		let reopened = FileSessionStore::open(&path).expect("Failed to reopen session snapshot.");
		let pair = rt
			.block_on(reopened.credentials())
			.expect("Failed to fetch credential pair from file store.")
			.expect("Rotated pair should survive a reopen.");

		assert_eq!(pair.access_token.expose(), "access-new");
		assert_eq!(pair.refresh_token.expose(), "refresh-1");

		rt.block_on(store.clear()).expect("Failed to clear the file store session.");

		let cleared = FileSessionStore::open(&path).expect("Failed to reopen cleared snapshot.");

		assert!(
			rt.block_on(cleared.credentials())
				.expect("Failed to fetch from cleared file store.")
				.is_none(),
			"Cleared session must not survive a reopen."
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary session snapshot {}: {e}", path.display())
		});
	}
}
