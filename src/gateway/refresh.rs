//! Single-flight credential refresh with a FIFO continuation queue.
//!
//! Every first 401 funnels into [`Gateway::refreshed_access_token`]. The first request
//! of a failure storm becomes the leader: it flips the in-flight latch inside the
//! gate's critical section, calls the refresh endpoint once, rotates the session store,
//! and drains the queued waiters in enqueue order with the shared outcome. A request
//! arriving while the latch is held parks on a oneshot channel instead of refreshing;
//! a request whose 401 raced a refresh that already settled re-reads the rotated token
//! and never touches the endpoint.

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	credential::TokenSecret,
	endpoint::RefreshGrant,
	error::RefreshError,
	gateway::Gateway,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionError,
	transport::HttpTransport,
};

enum GateRole {
	/// Performs the refresh call and drains the queue afterwards.
	Leader,
	/// Parks until the in-flight refresh settles.
	Follower(oneshot::Receiver<Option<TokenSecret>>),
	/// A refresh settled while the request was in flight; its rotated token is reused.
	AlreadyRotated,
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Resolves the access token a 401'd request must retry with, performing at most
	/// one refresh-endpoint call per failure storm.
	///
	/// Queued requests all observe the same outcome: the new token when the refresh
	/// succeeds, or [`RefreshError::FlightFailed`] when it does not. There is no mixed
	/// outcome across a storm.
	pub(crate) async fn refreshed_access_token(&self, observed_epoch: u64) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let role = {
			let mut gate = self.gate.lock();

			if gate.epoch != observed_epoch {
				GateRole::AlreadyRotated
			} else if gate.in_flight {
				let (tx, rx) = oneshot::channel();

				gate.waiters.push(tx);

				GateRole::Follower(rx)
			} else {
				// The latch must flip before this request first suspends, or a second
				// 401 could observe "no refresh in flight" and start a concurrent one.
				gate.in_flight = true;

				GateRole::Leader
			}
		};

		match role {
			GateRole::AlreadyRotated =>
				Ok(self.session.access_token().await?.ok_or(SessionError::NoActiveSession)?),
			GateRole::Follower(rx) => {
				self.metrics.record_coalesced();

				match rx.await {
					Ok(Some(token)) => Ok(token),
					Ok(None) | Err(_) => Err(RefreshError::FlightFailed.into()),
				}
			},
			GateRole::Leader => {
				let span = FlowSpan::new(KIND, "refreshed_access_token");

				obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

				let outcome = span.instrument(self.perform_refresh()).await;
				let waiters = {
					let mut gate = self.gate.lock();

					gate.in_flight = false;

					if outcome.is_ok() {
						gate.epoch = gate.epoch.wrapping_add(1);
					}

					mem::take(&mut gate.waiters)
				};
				let shared = outcome.as_ref().ok().cloned();

				for waiter in waiters {
					// A waiter whose caller dropped the request discards the outcome.
					let _ = waiter.send(shared.clone());
				}

				match &outcome {
					Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
					Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
				}

				outcome
			},
		}
	}

	/// Executes the refresh exchange and rotates the session store on success.
	///
	/// The rotation lands in the store before the leader returns, so queued waiters and
	/// later requests always observe the new token.
	async fn perform_refresh(&self) -> Result<TokenSecret> {
		self.metrics.record_attempt();

		let refresh_token = self
			.session
			.refresh_token()
			.await
			.inspect_err(|_| self.metrics.record_failure())?
			.ok_or_else(|| {
				self.metrics.record_failure();

				Error::from(RefreshError::MissingRefreshToken)
			})?;
		let request = self.endpoint.grant_request(refresh_token.expose()).map_err(|err| {
			self.metrics.record_failure();

			Error::from(err)
		})?;
		let response = self.transport.execute(request).await.map_err(|err| {
			self.metrics.record_failure();

			Error::from(err)
		})?;

		if !response.is_success() {
			self.metrics.record_failure();

			let status = response.status.as_u16();

			return Err(if response.status.is_server_error() {
				RefreshError::Unavailable { status }.into()
			} else {
				RefreshError::Rejected { status }.into()
			});
		}

		let grant: RefreshGrant = response.json().map_err(|source| {
			self.metrics.record_failure();

			Error::from(RefreshError::MalformedResponse { source })
		})?;
		let token = TokenSecret::new(grant.access_token);

		self.session
			.rotate_access_token(token.clone())
			.await
			.inspect_err(|_| self.metrics.record_failure())?;
		self.metrics.record_success();

		Ok(token)
	}
}
