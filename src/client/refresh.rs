//! Single-flight session refresh.
//!
//! At most one refresh request is in flight per client (and its clones). Callers that hit a 401
//! while a refresh is pending join it instead of sending another one, and all of them observe
//! the same outcome. The pending slot is cleared as soon as the refresh settles, before any
//! joined caller resumes, so the next 401 starts a fresh refresh.
//!
//! A caller dropped mid-refresh (timeout, aborted task) gives up its stake: a remaining joined
//! caller resends the refresh, and with nobody left the slot is freed.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	client::SessionClient,
	error::TransportError,
	http::{ApiRequest, ApiResponse, RequestOptions, SessionHttpClient},
	navigate::Navigator,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

type RefreshOutcome = Result<ApiResponse, Arc<TransportError>>;
type RefreshCell = Arc<AsyncOnceCell<RefreshOutcome>>;

/// Pending-refresh slot owned by a client.
///
/// Check-and-set happens under one synchronous lock, so two callers can never both observe an
/// idle slot.
#[derive(Debug, Default)]
pub(crate) struct RefreshGate(Mutex<Option<PendingRefresh>>);
impl RefreshGate {
	/// Joins the pending refresh, creating it when the slot is idle.
	fn join(&self) -> RefreshTicket<'_> {
		let mut pending = self.0.lock();
		let (cell, created) = match pending.as_mut() {
			Some(current) => {
				current.holders += 1;

				(current.cell.clone(), false)
			},
			None => {
				let cell = Arc::new(AsyncOnceCell::new());

				*pending = Some(PendingRefresh { cell: cell.clone(), holders: 1 });

				(cell, true)
			},
		};

		RefreshTicket { gate: self, cell, created }
	}

	/// Clears the slot if it still holds `cell`.
	fn settle(&self, cell: &RefreshCell) {
		let mut pending = self.0.lock();

		if pending.as_ref().is_some_and(|current| Arc::ptr_eq(&current.cell, cell)) {
			*pending = None;
		}
	}

	/// Drops one holder of `cell`; the slot is cleared once nobody is left to drive it.
	fn release(&self, cell: &RefreshCell) {
		let mut pending = self.0.lock();

		if let Some(current) = pending.as_mut().filter(|current| Arc::ptr_eq(&current.cell, cell)) {
			current.holders -= 1;

			if current.holders == 0 {
				*pending = None;
			}
		}
	}

	pub(crate) fn is_pending(&self) -> bool {
		self.0.lock().is_some()
	}
}

#[derive(Debug)]
struct PendingRefresh {
	cell: RefreshCell,
	holders: usize,
}

/// A caller's stake in the pending refresh.
///
/// Dropping a ticket before the refresh settles (a cancelled or timed-out caller) hands the
/// refresh over to the remaining holders, or frees the slot when there are none.
struct RefreshTicket<'a> {
	gate: &'a RefreshGate,
	cell: RefreshCell,
	created: bool,
}
impl Drop for RefreshTicket<'_> {
	fn drop(&mut self) {
		self.gate.release(&self.cell);
	}
}

impl<C, N> SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	/// Refreshes the session cookie, coalescing with any refresh already in flight.
	///
	/// Returns the refresh endpoint's response whatever its status; callers decide success via
	/// [`ApiResponse::ok`]. A transport failure is shared by every coalesced caller as
	/// [`Error::RefreshTransport`].
	pub async fn refresh_session(&self) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.descriptor.endpoint_url(&self.descriptor.endpoints.refresh)?;
				let ticket = self.refresh_gate.join();

				if !ticket.created {
					self.refresh_metrics.record_coalesced();
				}

				let pending = &ticket.cell;
				let outcome = ticket
					.cell
					.get_or_init(move || async move {
						let outcome = self.dispatch_refresh(url).await;

						self.refresh_gate.settle(pending);

						outcome
					})
					.await
					.clone();

				outcome.map_err(|source| Error::RefreshTransport { source })
			})
			.await;

		match &result {
			Ok(response) if response.ok() => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns `true` while a refresh request is in flight.
	pub fn refresh_pending(&self) -> bool {
		self.refresh_gate.is_pending()
	}

	async fn dispatch_refresh(&self, url: Url) -> RefreshOutcome {
		self.refresh_metrics.record_attempt();

		let request = ApiRequest::new(url, self.descriptor.origin(), RequestOptions::post());

		match self.dispatch(request).await {
			Ok(response) => {
				if response.ok() {
					self.refresh_metrics.record_success();
				} else {
					self.refresh_metrics.record_failure();
				}

				Ok(response)
			},
			Err(err) => {
				self.refresh_metrics.record_failure();

				Err(Arc::new(err))
			},
		}
	}
}
