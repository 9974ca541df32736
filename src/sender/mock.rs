//! Canned-response transport for tests.

// std
use std::{collections::VecDeque, io};
// crates.io
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	request::PendingRequest,
	response::Response,
	sender::{SendFuture, Sender},
};

/// Transport that replies from a queue of [`MockResponse`] values.
///
/// Every received request is recorded - exhausted-queue calls included - so tests can
/// assert on exactly what the pipeline delivered to the terminal step. Popping an
/// empty queue fails with [`ConfigError::MockQueueEmpty`].
#[derive(Debug, Default)]
pub struct MockSender {
	queue: Mutex<VecDeque<MockResponse>>,
	received: Mutex<Vec<PendingRequest>>,
}
impl MockSender {
	/// Creates a sender with an empty response queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a sender preloaded with the given responses, replied in order.
	pub fn with_responses(responses: impl IntoIterator<Item = MockResponse>) -> Self {
		let sender = Self::new();

		sender.queue.lock().extend(responses);

		sender
	}

	/// Appends a canned response to the back of the queue.
	pub fn push_response(&self, response: MockResponse) {
		self.queue.lock().push_back(response);
	}

	/// Requests received so far, in arrival order.
	pub fn received(&self) -> Vec<PendingRequest> {
		self.received.lock().clone()
	}

	/// Last request received, when any.
	pub fn last_received(&self) -> Option<PendingRequest> {
		self.received.lock().last().cloned()
	}
}
impl Sender for MockSender {
	fn send<'a>(&'a self, ctx: PendingRequest) -> SendFuture<'a> {
		self.received.lock().push(ctx.clone());

		let reply = self.queue.lock().pop_front();

		Box::pin(async move {
			match reply {
				Some(response) => response.into_result(&ctx),
				None => Err(ConfigError::MockQueueEmpty.into()),
			}
		})
	}
}

/// One canned reply held by a [`MockSender`].
#[derive(Clone, Debug)]
pub struct MockResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Bytes,
	fail_network: bool,
}
impl MockResponse {
	/// Creates an empty-bodied reply with the given status.
	pub fn new(status: StatusCode) -> Self {
		Self { status, headers: HeaderMap::new(), body: Bytes::new(), fail_network: false }
	}

	/// Creates an empty-bodied `200 OK` reply.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Creates a JSON reply with an `application/json` content type.
	pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
		let mut response = Self::new(status).with_body(
			serde_json::to_vec(value).expect("JSON value should always serialize."),
		);

		response.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		response
	}

	/// Creates a reply that fails with a transport error instead of responding.
	pub fn network_failure() -> Self {
		Self { fail_network: true, ..Self::new(StatusCode::OK) }
	}

	/// Replaces the reply body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();

		self
	}

	/// Adds a reply header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	fn into_result(self, ctx: &PendingRequest) -> Result<Response> {
		if self.fail_network {
			return Err(TransportError::Io(io::Error::new(
				io::ErrorKind::ConnectionReset,
				"injected mock network failure",
			))
			.into());
		}

		Ok(Response::new(self.status, self.headers, ctx.url.clone(), self.body))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn ctx(path: &str) -> PendingRequest {
		let url = Url::parse("https://api.example.com")
			.and_then(|base| base.join(path))
			.expect("Fixture URL should parse.");

		PendingRequest::new(Method::GET, url)
	}

	#[tokio::test]
	async fn replies_follow_queue_order() {
		let sender = MockSender::with_responses([
			MockResponse::new(StatusCode::CREATED),
			MockResponse::new(StatusCode::ACCEPTED),
		]);

		let first = sender.send(ctx("/a")).await.expect("First reply should be canned.");
		let second = sender.send(ctx("/b")).await.expect("Second reply should be canned.");

		assert_eq!(first.status(), StatusCode::CREATED);
		assert_eq!(second.status(), StatusCode::ACCEPTED);
	}

	#[tokio::test]
	async fn records_requests_even_when_exhausted() {
		let sender = MockSender::new();
		let err = sender.send(ctx("/missing")).await.expect_err("Empty queue should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MockQueueEmpty)));
		assert_eq!(sender.received().len(), 1);
		assert_eq!(sender.last_received().map(|req| req.url.path().to_owned()).as_deref(),
			Some("/missing"));
	}

	#[tokio::test]
	async fn injected_network_failure_surfaces_as_transport_error() {
		let sender = MockSender::with_responses([MockResponse::network_failure()]);
		let err = sender.send(ctx("/flaky")).await.expect_err("Injected failure should raise.");

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
