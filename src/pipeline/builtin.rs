//! Built-in middlewares covering the two most common pipeline customizations.

// self
use crate::{
	_prelude::*,
	pipeline::{Middleware, MiddlewareFuture, Next},
	request::PendingRequest,
};

/// Converts error-status responses into [`Error::Status`] failures.
///
/// Senders return responses for every status; inserting this stage makes non-2xx
/// results surface as errors to the stages *outside* it, which may catch and recover
/// them via [`StatusError::into_response`](crate::error::StatusError::into_response).
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorForStatus;
impl Middleware for ErrorForStatus {
	fn handle<'a>(&'a self, ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a> {
		Box::pin(async move { next.run(ctx).await?.error_for_status() })
	}
}

/// Re-invokes the continuation on transport failures.
///
/// Each retry runs the *entire* remaining chain again, terminal transport call
/// included; that is the documented multiple-invocation behavior of
/// [`Next`](crate::pipeline::Next). Only [`Error::Transport`] failures are retried;
/// status conversions and middleware errors pass through untouched.
#[derive(Clone, Copy, Debug)]
pub struct Retry {
	/// Additional attempts performed after the initial one.
	pub attempts: u32,
}
impl Retry {
	/// Creates a policy allowing `attempts` additional attempts.
	pub fn new(attempts: u32) -> Self {
		Self { attempts }
	}
}
impl Middleware for Retry {
	fn handle<'a>(&'a self, ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a> {
		Box::pin(async move {
			let mut remaining = self.attempts;

			loop {
				match next.run(ctx.clone()).await {
					Err(Error::Transport(_)) if remaining > 0 => remaining -= 1,
					outcome => return outcome,
				}
			}
		})
	}
}
