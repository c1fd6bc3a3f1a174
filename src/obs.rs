//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `session_fetch.flow` with the `flow`
//!   (operation) and `stage` (call site) fields, plus an `info` event per navigation.
//! - Enable `metrics` to increment the `session_fetch_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `session_fetch_navigation_total` counter labeled by `reason`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Wrapped application request.
	Request,
	/// Shared session refresh.
	Refresh,
	/// Logout.
	Logout,
	/// Session probe against the `me` endpoint.
	SessionProbe,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Request => "request",
			FlowKind::Refresh => "refresh",
			FlowKind::Logout => "logout",
			FlowKind::SessionProbe => "session_probe",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why the client navigated the browsing context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationReason {
	/// Session could not be refreshed.
	LoginRequired,
	/// Server denied access (403).
	Forbidden,
	/// Logout was requested.
	Logout,
}
impl NavigationReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			NavigationReason::LoginRequired => "login_required",
			NavigationReason::Forbidden => "forbidden",
			NavigationReason::Logout => "logout",
		}
	}
}
impl Display for NavigationReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
