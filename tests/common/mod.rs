//! Shared fixtures for the integration suites.

#![allow(dead_code)]

// std
use std::sync::{Arc, Mutex};
// crates.io
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;
// courier
use courier::{
	auth::Authenticator,
	error::{Error, TransportError},
	oauth2::{AuthorizationCodeGrant, OAuthConfig},
	pipeline::{Middleware, MiddlewareFuture, Next, PipelineHandle},
	request::{Body, PendingRequest, Request},
	response::Response,
	sender::{MockSender, SendFuture, Sender},
};

pub type OrderLog = Arc<Mutex<Vec<String>>>;

pub fn order_log() -> OrderLog {
	Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &OrderLog) -> Vec<String> {
	log.lock().expect("Order log should not be poisoned.").clone()
}

pub fn record(log: &OrderLog, marker: impl Into<String>) {
	log.lock().expect("Order log should not be poisoned.").push(marker.into());
}

pub fn ctx(path: &str) -> PendingRequest {
	let url = Url::parse("https://api.example.com")
		.and_then(|base| base.join(path))
		.expect("Fixture URL should parse.");

	PendingRequest::new(Method::GET, url)
}

pub fn empty_response(status: StatusCode, url: &Url) -> Response {
	Response::new(status, HeaderMap::new(), url.clone(), Bytes::new())
}

/// Middleware recording `pre:<tag>`/`post:<tag>` markers around the continuation.
pub struct Recorder {
	tag: &'static str,
	log: OrderLog,
	call_next: bool,
}
impl Recorder {
	pub fn new(tag: &'static str, log: &OrderLog) -> Self {
		Self { tag, log: log.clone(), call_next: true }
	}

	/// Variant that returns its own response without invoking the continuation.
	pub fn short_circuit(tag: &'static str, log: &OrderLog) -> Self {
		Self { call_next: false, ..Self::new(tag, log) }
	}
}
impl Middleware for Recorder {
	fn handle<'a>(&'a self, ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a> {
		Box::pin(async move {
			record(&self.log, format!("pre:{}", self.tag));

			if !self.call_next {
				return Ok(empty_response(StatusCode::NO_CONTENT, &ctx.url));
			}

			let result = next.run(ctx).await;

			record(&self.log, format!("post:{}", self.tag));

			result
		})
	}
}

/// Middleware substituting a recovered response for transport failures raised below it.
pub struct RecoverTransport;
impl Middleware for RecoverTransport {
	fn handle<'a>(&'a self, ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a> {
		Box::pin(async move {
			let url = ctx.url.clone();

			match next.run(ctx).await {
				Err(Error::Transport(_)) => Ok(empty_response(StatusCode::OK, &url)),
				outcome => outcome,
			}
		})
	}
}

/// Middleware releasing the response retained inside status errors raised below it.
pub struct RecoverStatus;
impl Middleware for RecoverStatus {
	fn handle<'a>(&'a self, ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a> {
		Box::pin(async move {
			match next.run(ctx).await {
				Err(Error::Status(status_err)) => Ok(status_err.into_response()),
				outcome => outcome,
			}
		})
	}
}

/// Terminal sender recording a `terminal` marker for every call.
pub struct ProbeSender {
	log: OrderLog,
	fail: bool,
}
impl ProbeSender {
	pub fn new(log: &OrderLog) -> Self {
		Self { log: log.clone(), fail: false }
	}

	/// Variant failing every call with a transport error.
	pub fn failing(log: &OrderLog) -> Self {
		Self { fail: true, ..Self::new(log) }
	}

	pub fn terminal_calls(&self) -> usize {
		entries(&self.log).iter().filter(|marker| marker.as_str() == "terminal").count()
	}
}
impl Sender for ProbeSender {
	fn send<'a>(&'a self, ctx: PendingRequest) -> SendFuture<'a> {
		record(&self.log, "terminal");

		Box::pin(async move {
			if self.fail {
				return Err(TransportError::Io(std::io::Error::new(
					std::io::ErrorKind::ConnectionReset,
					"probe transport failure",
				))
				.into());
			}

			Ok(empty_response(StatusCode::OK, &ctx.url))
		})
	}
}

/// Connector fixture backed by a [`MockSender`], optionally with OAuth configuration.
pub struct TestConnector {
	base_url: Url,
	sender: MockSender,
	pipeline: PipelineHandle,
	oauth: Option<OAuthConfig>,
}
impl TestConnector {
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: Url::parse(base_url).expect("Base URL fixture should parse."),
			sender: MockSender::default(),
			pipeline: PipelineHandle::default(),
			oauth: None,
		}
	}

	pub fn with_oauth(mut self, config: OAuthConfig) -> Self {
		self.oauth = Some(config);

		self
	}

	pub fn mock(&self) -> &MockSender {
		&self.sender
	}
}
impl courier::connector::Connector for TestConnector {
	fn base_url(&self) -> Url {
		self.base_url.clone()
	}

	fn sender(&self) -> &dyn Sender {
		&self.sender
	}

	fn pipeline(&self) -> &PipelineHandle {
		&self.pipeline
	}
}
impl AuthorizationCodeGrant for TestConnector {
	fn oauth_config(&self) -> &OAuthConfig {
		self.oauth.as_ref().expect("Fixture should be built with an OAuth configuration.")
	}
}

/// Request fixture assembled field by field.
pub struct TestRequest {
	method: Method,
	endpoint: String,
	headers: Vec<(String, String)>,
	query: Vec<(String, String)>,
	body: Body,
	timeout: Option<time::Duration>,
	authenticator: Option<Arc<dyn Authenticator>>,
}
impl TestRequest {
	pub fn get(endpoint: &str) -> Self {
		Self::new(Method::GET, endpoint)
	}

	pub fn post(endpoint: &str) -> Self {
		Self::new(Method::POST, endpoint)
	}

	fn new(method: Method, endpoint: &str) -> Self {
		Self {
			method,
			endpoint: endpoint.into(),
			headers: Vec::new(),
			query: Vec::new(),
			body: Body::Empty,
			timeout: None,
			authenticator: None,
		}
	}

	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	pub fn with_query(mut self, key: &str, value: &str) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	pub fn with_body(mut self, body: Body) -> Self {
		self.body = body;

		self
	}

	pub fn with_timeout(mut self, timeout: time::Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	pub fn with_authenticator(mut self, authenticator: impl 'static + Authenticator) -> Self {
		self.authenticator = Some(Arc::new(authenticator));

		self
	}
}
impl Request for TestRequest {
	fn method(&self) -> Method {
		self.method.clone()
	}

	fn endpoint(&self) -> String {
		self.endpoint.clone()
	}

	fn headers(&self) -> Vec<(String, String)> {
		self.headers.clone()
	}

	fn query(&self) -> Vec<(String, String)> {
		self.query.clone()
	}

	fn body(&self) -> courier::error::Result<Body> {
		Ok(self.body.clone())
	}

	fn timeout(&self) -> Option<time::Duration> {
		self.timeout
	}

	fn authenticator(&self) -> Option<&dyn Authenticator> {
		self.authenticator.as_deref()
	}
}
