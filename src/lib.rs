//! Authenticated request gateway that coalesces credential refreshes into a single flight
//! and replays queued requests without duplicate refresh calls.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod credential;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod obs;
pub mod session;
pub mod transport;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and fixtures for the crate's own unit and integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		credential::CredentialPair,
		endpoint::RefreshEndpoint,
		gateway::Gateway,
		session::{MemorySessionStore, SessionStore},
		transport::ReqwestTransport,
	};

	/// Gateway type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGateway = Gateway<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`Gateway`] backed by an in-memory session store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_gateway(
		endpoint: RefreshEndpoint,
	) -> (ReqwestTestGateway, Arc<MemorySessionStore>) {
		let session_backend = Arc::new(MemorySessionStore::default());
		let session: Arc<dyn SessionStore> = session_backend.clone();
		let gateway = Gateway::with_transport(session, endpoint, test_reqwest_transport());

		(gateway, session_backend)
	}

	/// Installs a credential pair fixture into the provided session store.
	pub async fn seed_session(store: &MemorySessionStore, access: &str, refresh: &str) {
		store
			.install(CredentialPair::new(access, refresh))
			.await
			.expect("Failed to seed credential pair into the session store.");
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use http::{HeaderMap, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
