//! Authenticated request dispatch with transparent 401 recovery.

mod metrics;
mod refresh;

pub use metrics::GatewayMetrics;

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	credential::TokenSecret,
	endpoint::RefreshEndpoint,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionStore,
	transport::{HttpTransport, Request, Response},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport stack.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Coordinates authenticated dispatch against a single refresh endpoint.
///
/// The gateway owns the transport, session store, refresh endpoint descriptor, and the
/// refresh gate, so [`send`](Self::send) can recover from an expired access token
/// without surfacing the 401 to its caller. All shared state lives behind `Arc`s;
/// cloning a gateway yields another handle onto the same single-flight gate, and
/// independent gateways keep fully isolated gates.
#[derive(Clone)]
pub struct Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request, refresh exchanges included.
	pub transport: Arc<T>,
	/// Session store holding the current credential pair.
	pub session: Arc<dyn SessionStore>,
	/// Validated refresh endpoint descriptor.
	pub endpoint: RefreshEndpoint,
	/// Shared metrics recorder for refresh activity.
	pub metrics: Arc<GatewayMetrics>,
	gate: Arc<Mutex<RefreshGate>>,
}

/// Single-flight refresh gate: the in-flight latch, the storm epoch, and the FIFO
/// queue of suspended requests.
///
/// `epoch` advances on every successful rotation. A request snapshots it before
/// dispatching; a stale snapshot at 401 time means a refresh already settled while the
/// request was in flight, so the rotated token is reused instead of refreshing again.
#[derive(Default)]
struct RefreshGate {
	in_flight: bool,
	epoch: u64,
	waiters: Vec<oneshot::Sender<Option<TokenSecret>>>,
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_transport(
		session: Arc<dyn SessionStore>,
		endpoint: RefreshEndpoint,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			session,
			endpoint,
			metrics: Default::default(),
			gate: Default::default(),
		}
	}

	/// Issues `request` with the current access token attached, transparently
	/// refreshing the credential and retrying once on a 401.
	///
	/// Responses with any other status, success or error, pass through unchanged; they
	/// are not this gateway's concern. A request that still receives 401 after the
	/// refresh-and-retry cycle fails terminally with [`Error::Unauthorized`].
	pub async fn send(&self, request: Request) -> Result<Response> {
		const KIND: FlowKind = FlowKind::Dispatch;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn dispatch(&self, request: Request) -> Result<Response> {
		let observed_epoch = self.gate.lock().epoch;
		let response = match self.session.access_token().await? {
			Some(token) => self.transport.execute(request.clone().bearer(&token)?).await?,
			None => self.transport.execute(request.clone()).await?,
		};

		if response.status != StatusCode::UNAUTHORIZED {
			return Ok(response);
		}

		// Single retry per request. The token comes back through the gate, never from
		// the value captured before the first dispatch.
		let fresh = self.refreshed_access_token(observed_epoch).await?;
		let retried = self.transport.execute(request.bearer(&fresh)?).await?;

		if retried.status == StatusCode::UNAUTHORIZED {
			return Err(Error::Unauthorized);
		}

		Ok(retried)
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a gateway backed by the crate's default reqwest transport.
	///
	/// The gateway provisions its own client, so callers do not need to pass HTTP
	/// handles explicitly; use [`Gateway::with_transport`] to share a configured one.
	pub fn new(session: Arc<dyn SessionStore>, endpoint: RefreshEndpoint) -> Self {
		Self::with_transport(session, endpoint, ReqwestTransport::default())
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway").field("endpoint", &self.endpoint).finish()
	}
}
