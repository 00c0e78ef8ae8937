//! Transport primitives for authenticated request dispatch.
//!
//! The module exposes [`HttpTransport`] alongside the [`Request`]/[`Response`] pair so
//! downstream crates can put custom HTTP clients behind the gateway. Transports report
//! only transport-level failures (DNS, TCP, TLS, IO) as errors; every HTTP status,
//! including 401, resolves as a [`Response`] for the gateway to inspect.

// std
use std::ops::Deref;
// crates.io
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	credential::TokenSecret,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing gateway requests.
///
/// The trait is the gateway's only dependency on an HTTP stack. Callers provide an
/// implementation (typically behind `Arc<T>` where `T: HttpTransport`) and the gateway
/// dispatches both ordinary requests and refresh exchanges through it. Implementations
/// must be `Send + Sync` so a gateway can be shared across tasks, and the futures they
/// return must own whatever state they need so they remain `Send` while in flight.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Dispatches the request and resolves with the raw response.
	fn execute(&self, request: Request) -> TransportFuture<'_, Response>;
}

/// Outbound HTTP request dispatched through the gateway.
#[derive(Clone, Debug)]
pub struct Request {
	/// HTTP method.
	pub method: Method,
	/// Target URL.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Optional request body bytes.
	pub body: Option<Vec<u8>>,
}
impl Request {
	/// Creates a request with the provided method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Convenience constructor for `GET` requests.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Convenience constructor for `POST` requests.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Sets a header, replacing any previous value under the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `payload` as the JSON body and stamps the content type.
	pub fn json<T>(mut self, payload: &T) -> Result<Self, ConfigError>
	where
		T: Serialize,
	{
		self.body = Some(serde_json::to_vec(payload)?);
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Attaches `Authorization: Bearer <token>`, replacing any previous credential.
	pub fn bearer(mut self, token: &TokenSecret) -> Result<Self, ConfigError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))?;

		value.set_sensitive(true);
		self.headers.insert(AUTHORIZATION, value);

		Ok(self)
	}
}

/// Raw HTTP response surfaced by a transport.
#[derive(Clone, Debug)]
pub struct Response {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl Response {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Deserializes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: serde::de::DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// The gateway passes every outbound request, refresh exchanges included, through the
/// wrapped client, so connection pooling and TLS configuration apply uniformly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: Request) -> TransportFuture<'_, Response> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method, request.url).headers(request.headers);

			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(Response { status, headers, body })
		})
	}
}
