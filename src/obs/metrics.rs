// self
use crate::obs::{FlowKind, FlowOutcome, NavigationReason};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"session_fetch_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a browsing-context navigation via the global metrics recorder (when enabled).
pub fn record_navigation_metric(reason: NavigationReason) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("session_fetch_navigation_total", "reason" => reason.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}
