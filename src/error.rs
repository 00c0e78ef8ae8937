//! Gateway-level error types shared across the session, transport, and refresh layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session-store failure.
	#[error("{0}")]
	Session(
		#[from]
		#[source]
		crate::session::SessionError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Credential refresh failure.
	#[error(transparent)]
	Refresh(#[from] RefreshError),

	/// A retried request failed with 401 again; the failure is terminal.
	#[error("Request remained unauthorized after a token refresh.")]
	Unauthorized,
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Refresh endpoint URL uses a scheme the transport cannot dispatch.
	#[error("Refresh endpoint URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// The rejected scheme.
		scheme: String,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	BodySerialization(#[from] serde_json::Error),
	/// Header value contains bytes rejected by the HTTP layer.
	#[error("Header value is invalid.")]
	InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Refresh outcomes that could not produce a new access token.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// No refresh token exists; the refresh endpoint is never called in this case.
	#[error("No refresh token is available in the session store.")]
	MissingRefreshToken,
	/// Endpoint rejected the refresh token (4xx); the credential is unusable.
	#[error("Refresh endpoint rejected the request with status {status}.")]
	Rejected {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Endpoint failed upstream (5xx); callers may retry later.
	#[error("Refresh endpoint is unavailable (status {status}).")]
	Unavailable {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Endpoint responded with a payload that is not the expected grant shape.
	#[error("Refresh endpoint returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The refresh this request was queued behind failed; the request fails with it.
	#[error("The in-flight token refresh failed.")]
	FlightFailed,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while dispatching the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while dispatching the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
