// self
use crate::obs::{Operation, OperationOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation_outcome(operation: Operation, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"faceid_operation_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

/// Records a cache lookup (hit or refresh) via the global metrics recorder (when enabled).
pub fn record_cache_lookup(cache: &'static str, refreshed: bool) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"faceid_cache_lookup_total",
			"cache" => cache,
			"result" => if refreshed { "refresh" } else { "hit" }
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (cache, refreshed);
	}
}
