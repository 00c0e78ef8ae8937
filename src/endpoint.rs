//! Refresh endpoint descriptor and its wire contract.

// crates.io
use http::header::{ACCEPT, HeaderValue};
// self
use crate::{_prelude::*, error::ConfigError, transport::Request};

/// Wire request presented to the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshGrantRequest<'a> {
	/// Refresh token exchanged for a new access token.
	pub refresh_token: &'a str,
}

/// Wire response produced by the refresh endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshGrant {
	/// Newly minted access token.
	pub access_token: String,
}

/// Validated descriptor for the credential refresh endpoint.
///
/// The contract is `POST {"refreshToken": ...}` answered with `{"accessToken": ...}`;
/// any non-2xx status or malformed body is a refresh failure.
#[derive(Clone, Debug)]
pub struct RefreshEndpoint {
	url: Url,
}
impl RefreshEndpoint {
	/// Validates and wraps the refresh endpoint URL.
	pub fn new(url: Url) -> Result<Self, ConfigError> {
		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: url.scheme().into() });
		}

		Ok(Self { url })
	}

	/// Returns the endpoint URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Builds the `POST` request carrying the refresh token.
	pub(crate) fn grant_request(&self, refresh_token: &str) -> Result<Request, ConfigError> {
		Request::post(self.url.clone())
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.json(&RefreshGrantRequest { refresh_token })
	}
}
