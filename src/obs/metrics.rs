// self
use crate::obs::{RefreshOutcome, RefreshPath};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("singleflight_refresh_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records which side of the race an invocation resolved to (when enabled).
pub fn record_refresh_path(path: RefreshPath) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("singleflight_refresh_path_total", "path" => path.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = path;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_refresh_outcome(RefreshOutcome::Failure);
		record_refresh_path(RefreshPath::Waiter);
	}
}
