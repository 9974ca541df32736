// self
use crate::{_prelude::*, request::PendingRequest};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedSend<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedSend<F> = F;

/// A span builder wrapping one dispatched request.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the request's method, host, and path.
	///
	/// Query strings and headers are deliberately omitted from span fields.
	pub fn new(ctx: &PendingRequest) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"courier.send",
				method = %ctx.method,
				host = ctx.url.host_str().unwrap_or(""),
				path = ctx.url.path(),
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = ctx;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedSend<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
