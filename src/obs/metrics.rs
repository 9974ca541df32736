// self
use crate::{_prelude::*, obs::SendOutcome};

/// Records a dispatch outcome via the global metrics recorder (when enabled).
pub fn record_send_outcome(method: &Method, outcome: SendOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"courier_send_total",
			"method" => method.as_str().to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, outcome);
	}
}
