//! Optional observability helpers for dispatched requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `courier.send` carrying the
//!   request `method`, `host`, and `path` (never query strings or headers, which may
//!   hold secrets).
//! - Enable `metrics` to increment the `courier_send_total` counter for every
//!   attempt/success/failure, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each dispatched request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SendOutcome {
	/// Entry to a dispatch helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl SendOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SendOutcome::Attempt => "attempt",
			SendOutcome::Success => "success",
			SendOutcome::Failure => "failure",
		}
	}
}
impl Display for SendOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
