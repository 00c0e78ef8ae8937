// crates.io
use time::macros;
// self
use bearer_gateway::{
	credential::{CredentialPair, TokenSecret},
	session::{MemorySessionStore, SessionError, SessionStore},
};

fn build_pair(access: &str, refresh: &str) -> CredentialPair {
	CredentialPair::new(access, refresh).with_issued_at(macros::datetime!(2026-06-01 09:00 UTC))
}

#[tokio::test]
async fn install_and_fetch_round_trip() {
	let store = MemorySessionStore::default();

	store
		.install(build_pair("access-1", "refresh-1"))
		.await
		.expect("Installing a credential pair into the memory store should succeed.");

	let pair = store
		.credentials()
		.await
		.expect("Fetching credentials from the memory store should succeed.")
		.expect("Installed pair should remain present.");

	assert_eq!(pair.access_token.expose(), "access-1");
	assert_eq!(pair.refresh_token.expose(), "refresh-1");
	assert_eq!(
		store
			.access_token()
			.await
			.expect("Access token read should succeed.")
			.map(|token| token.expose().to_string()),
		Some("access-1".into())
	);
	assert_eq!(
		store
			.refresh_token()
			.await
			.expect("Refresh token read should succeed.")
			.map(|token| token.expose().to_string()),
		Some("refresh-1".into())
	);
}

#[tokio::test]
async fn rotation_replaces_access_and_keeps_refresh() {
	let store = MemorySessionStore::default();

	store
		.install(build_pair("access-old", "refresh-1"))
		.await
		.expect("Installing a credential pair into the memory store should succeed.");
	store
		.rotate_access_token(TokenSecret::new("access-new"))
		.await
		.expect("Rotating the access token should succeed.");

	let pair = store
		.credentials()
		.await
		.expect("Fetching credentials after rotation should succeed.")
		.expect("Rotated pair should remain present.");

	assert_eq!(pair.access_token.expose(), "access-new");
	assert_eq!(pair.refresh_token.expose(), "refresh-1");
	assert!(pair.rotated_at.is_some(), "Rotation must stamp the rotated-at instant.");
}

#[tokio::test]
async fn reinstall_replaces_the_previous_session() {
	let store = MemorySessionStore::default();

	store
		.install(build_pair("access-1", "refresh-1"))
		.await
		.expect("Installing the first credential pair should succeed.");
	store
		.install(build_pair("access-2", "refresh-2"))
		.await
		.expect("Installing the second credential pair should succeed.");

	let pair = store
		.credentials()
		.await
		.expect("Fetching credentials after reinstall should succeed.")
		.expect("Second pair should be present.");

	assert_eq!(pair.access_token.expose(), "access-2");
	assert_eq!(pair.refresh_token.expose(), "refresh-2");
}

#[tokio::test]
async fn clear_destroys_the_session_and_blocks_rotation() {
	let store = MemorySessionStore::default();

	store
		.install(build_pair("access-1", "refresh-1"))
		.await
		.expect("Installing a credential pair into the memory store should succeed.");
	store.clear().await.expect("Clearing the session should succeed.");

	assert!(
		store
			.credentials()
			.await
			.expect("Fetching credentials after clear should succeed.")
			.is_none(),
		"Cleared session must not linger."
	);

	let err = store
		.rotate_access_token(TokenSecret::new("access-after-logout"))
		.await
		.expect_err("Rotation without an installed pair must fail.");

	assert_eq!(err, SessionError::NoActiveSession);
}
