// std
use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use url::Url;
// self
use bearer_gateway::{
	credential::CredentialPair,
	endpoint::RefreshEndpoint,
	gateway::Gateway,
	session::{MemorySessionStore, SessionStore},
	transport::{HttpTransport, Request, Response, TransportFuture},
};

/// Scripted transport: the refresh endpoint stays in flight for a fixed delay and then
/// grants `fresh`; every other path answers 200 only to `Bearer fresh` and 401 to
/// anything else, recording the credential each dispatch carried.
struct FakeTransport {
	refresh_calls: AtomicU64,
	seen_authorizations: Mutex<Vec<Option<String>>>,
	refresh_delay: StdDuration,
}
impl FakeTransport {
	fn new(refresh_delay: StdDuration) -> Self {
		Self {
			refresh_calls: AtomicU64::new(0),
			seen_authorizations: Mutex::new(Vec::new()),
			refresh_delay,
		}
	}

	fn refresh_calls(&self) -> u64 {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	fn seen_authorizations(&self) -> Vec<Option<String>> {
		self.seen_authorizations
			.lock()
			.expect("Authorization log mutex should not be poisoned.")
			.clone()
	}
}
impl HttpTransport for FakeTransport {
	fn execute(&self, request: Request) -> TransportFuture<'_, Response> {
		Box::pin(async move {
			if request.url.path() == "/auth/refresh" {
				self.refresh_calls.fetch_add(1, Ordering::SeqCst);

				tokio::time::sleep(self.refresh_delay).await;

				return Ok(Response {
					status: StatusCode::OK,
					headers: HeaderMap::new(),
					body: br#"{"accessToken":"fresh"}"#.to_vec(),
				});
			}

			let authorization = request
				.headers
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_string);

			self.seen_authorizations
				.lock()
				.expect("Authorization log mutex should not be poisoned.")
				.push(authorization.clone());

			let status = if authorization.as_deref() == Some("Bearer fresh") {
				StatusCode::OK
			} else {
				StatusCode::UNAUTHORIZED
			};

			Ok(Response { status, headers: HeaderMap::new(), body: Vec::new() })
		})
	}
}

fn build_gateway(
	transport: Arc<FakeTransport>,
) -> (Gateway<FakeTransport>, Arc<MemorySessionStore>) {
	let session_backend = Arc::new(MemorySessionStore::default());
	let session: Arc<dyn SessionStore> = session_backend.clone();
	let endpoint = RefreshEndpoint::new(
		Url::parse("https://lms.example.com/auth/refresh")
			.expect("Fixture endpoint URL should parse successfully."),
	)
	.expect("Fixture endpoint should be accepted.");
	let gateway = Gateway::with_transport(session, endpoint, transport);

	(gateway, session_backend)
}

#[tokio::test]
async fn a_storm_of_five_requests_triggers_exactly_one_refresh() {
	let transport = Arc::new(FakeTransport::new(StdDuration::from_millis(100)));
	let (gateway, session) = build_gateway(transport.clone());

	session
		.install(CredentialPair::new("stale", "refresh-1"))
		.await
		.expect("Installing the fixture pair should succeed.");

	let url = Url::parse("https://lms.example.com/lessons")
		.expect("Fixture resource URL should parse successfully.");
	let (first, second, third, fourth, fifth) = tokio::join!(
		gateway.send(Request::get(url.clone())),
		gateway.send(Request::get(url.clone())),
		gateway.send(Request::get(url.clone())),
		gateway.send(Request::get(url.clone())),
		gateway.send(Request::get(url)),
	);

	for response in [first, second, third, fourth, fifth] {
		let response = response.expect("Every request of the storm should succeed.");

		assert_eq!(response.status, StatusCode::OK);
	}

	assert_eq!(transport.refresh_calls(), 1, "The storm must coalesce into a single refresh.");

	let pair = session
		.credentials()
		.await
		.expect("Session fetch should succeed after the storm.")
		.expect("Session should remain installed after the storm.");

	assert_eq!(pair.access_token.expose(), "fresh");
}

#[tokio::test]
async fn replays_carry_the_rotated_token_and_never_the_stale_one() {
	let transport = Arc::new(FakeTransport::new(StdDuration::from_millis(100)));
	let (gateway, session) = build_gateway(transport.clone());

	session
		.install(CredentialPair::new("stale", "refresh-1"))
		.await
		.expect("Installing the fixture pair should succeed.");

	let url = Url::parse("https://lms.example.com/quizzes")
		.expect("Fixture resource URL should parse successfully.");
	let (first, second, third) = tokio::join!(
		gateway.send(Request::get(url.clone())),
		gateway.send(Request::get(url.clone())),
		gateway.send(Request::get(url)),
	);

	for response in [first, second, third] {
		response.expect("Every request of the storm should succeed.");
	}

	let seen = transport.seen_authorizations();
	let stale = seen.iter().filter(|auth| auth.as_deref() == Some("Bearer stale")).count();
	let fresh = seen.iter().filter(|auth| auth.as_deref() == Some("Bearer fresh")).count();

	assert_eq!(stale + fresh, seen.len(), "No dispatch may carry any other credential.");
	assert_eq!(fresh, 3, "Every request replays exactly once with the rotated token.");
}
