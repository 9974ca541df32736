//! Connector traits that assemble requests and dispatch them through the pipeline.

// crates.io
use http::HeaderName;
// self
use crate::{
	_prelude::*,
	auth::Authenticator,
	error::ConfigError,
	obs::{self, RequestSpan, SendOutcome},
	request::{PendingRequest, Request},
	sender::{SendFuture, Sender},
};

/// Reusable description of one upstream API.
///
/// A connector owns its base URL, its terminal [`Sender`], and a [`PipelineHandle`]
/// (there is no global transport state - everything travels by explicit handle). The
/// provided [`send`](Connector::send) method assembles a [`PendingRequest`] from the
/// connector's defaults and the request's specifics, snapshots the pipeline, and runs
/// the composed chain against the connector's sender.
pub trait Connector
where
	Self: Send + Sync,
{
	/// Base URL every relative endpoint is joined against.
	fn base_url(&self) -> Url;

	/// Terminal transport used as the final stage of every run.
	fn sender(&self) -> &dyn Sender;

	/// Shared middleware pipeline wrapping every dispatched request.
	fn pipeline(&self) -> &crate::pipeline::PipelineHandle;

	/// Headers applied to every request; request-specific headers overlay these.
	fn default_headers(&self) -> Vec<(String, String)> {
		Vec::new()
	}

	/// Query pairs applied to every request, ahead of request-specific pairs.
	fn default_query(&self) -> Vec<(String, String)> {
		Vec::new()
	}

	/// Connector-wide authenticator, used when the request supplies none.
	fn authenticator(&self) -> Option<&dyn Authenticator> {
		None
	}

	/// Assembles the request context dispatched through the pipeline.
	///
	/// URL joining, header/query merging, body and timeout transfer, then the
	/// authenticator (request's, else connector's) applied last.
	fn pending(&self, request: &dyn Request) -> Result<PendingRequest> {
		let url = join_url(&self.base_url(), &request.endpoint())?;
		let mut pending = PendingRequest::new(request.method(), url);

		for (name, value) in self.default_headers().into_iter().chain(request.headers()) {
			let name = HeaderName::try_from(name.as_str()).map_err(ConfigError::from)?;

			pending.insert_header(name, &value)?;
		}
		for (key, value) in self.default_query().into_iter().chain(request.query()) {
			pending.append_query(&key, &value);
		}

		pending.body = request.body()?;
		pending.timeout = request.timeout();

		if let Some(authenticator) = request.authenticator().or_else(|| self.authenticator()) {
			authenticator.authenticate(&mut pending)?;
		}

		Ok(pending)
	}

	/// Dispatches `request` through the pipeline against the connector's own sender.
	fn send<'a>(&'a self, request: &dyn Request) -> SendFuture<'a> {
		self.send_with(request, self.sender())
	}

	/// Dispatches `request` through the pipeline against a caller-supplied sender.
	///
	/// The pipeline is snapshotted here, before the returned future is polled, so
	/// registry mutations performed afterwards never affect this dispatch.
	fn send_with<'a>(&'a self, request: &dyn Request, sender: &'a dyn Sender) -> SendFuture<'a> {
		let pending = self.pending(request);
		let snapshot = self.pipeline().snapshot();

		Box::pin(async move {
			let pending = pending?;
			let method = pending.method.clone();
			let span = RequestSpan::new(&pending);

			obs::record_send_outcome(&method, SendOutcome::Attempt);

			let result = span.instrument(snapshot.run(pending, sender)).await;
			let outcome =
				if result.is_ok() { SendOutcome::Success } else { SendOutcome::Failure };

			obs::record_send_outcome(&method, outcome);

			result
		})
	}
}

/// Joins an endpoint onto a base URL.
///
/// Absolute endpoints pass through untouched; relative endpoints are joined with
/// exactly one slash regardless of how base and endpoint spell their edges.
pub fn join_url(base: &Url, endpoint: &str) -> Result<Url, ConfigError> {
	match Url::parse(endpoint) {
		Ok(absolute) => Ok(absolute),
		Err(url::ParseError::RelativeUrlWithoutBase) => {
			let joined = format!(
				"{}/{}",
				base.as_str().trim_end_matches('/'),
				endpoint.trim_start_matches('/')
			);

			Url::parse(&joined)
				.map_err(|source| ConfigError::InvalidUrl { endpoint: endpoint.into(), source })
		},
		Err(source) => Err(ConfigError::InvalidUrl { endpoint: endpoint.into(), source }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, auth::TokenAuthenticator, request::Body};

	fn base() -> Url {
		Url::parse("https://api.example.com/v1").expect("Fixture URL should parse.")
	}

	#[test]
	fn join_url_inserts_exactly_one_slash() {
		for (base, endpoint) in [
			("https://api.example.com/v1", "users"),
			("https://api.example.com/v1/", "users"),
			("https://api.example.com/v1", "/users"),
			("https://api.example.com/v1/", "/users"),
		] {
			let base = Url::parse(base).expect("Fixture base should parse.");
			let joined = join_url(&base, endpoint).expect("Join should succeed.");

			assert_eq!(joined.as_str(), "https://api.example.com/v1/users");
		}
	}

	#[test]
	fn join_url_passes_absolute_endpoints_through() {
		let joined =
			join_url(&base(), "https://other.example.com/hook").expect("Join should succeed.");

		assert_eq!(joined.as_str(), "https://other.example.com/hook");
	}

	#[test]
	fn pending_merges_defaults_with_request_specifics() {
		let connector = MockConnector::new("https://api.example.com/v1")
			.with_default_header("accept", "application/json")
			.with_default_header("x-client", "courier")
			.with_default_query("page", "1");
		let request = StubRequest::get("users")
			.with_header("x-client", "override")
			.with_query("limit", "50");
		let pending = connector.pending(&request).expect("Assembly should succeed.");

		assert_eq!(pending.url.path(), "/v1/users");
		assert_eq!(pending.url.query(), Some("page=1&limit=50"));
		assert_eq!(
			pending.headers.get("accept").and_then(|value| value.to_str().ok()),
			Some("application/json")
		);
		// The request-specific header wins over the connector default.
		assert_eq!(
			pending.headers.get("x-client").and_then(|value| value.to_str().ok()),
			Some("override")
		);
	}

	#[test]
	fn request_authenticator_wins_over_the_connector_default() {
		let connector = MockConnector::new("https://api.example.com")
			.with_authenticator(TokenAuthenticator::new("connector-token"));
		let request =
			StubRequest::get("me").with_authenticator(TokenAuthenticator::new("request-token"));
		let pending = connector.pending(&request).expect("Assembly should succeed.");

		assert_eq!(
			pending.headers.get("authorization").and_then(|value| value.to_str().ok()),
			Some("Bearer request-token")
		);
	}

	#[tokio::test]
	async fn send_delivers_the_assembled_context_to_the_sender() {
		let connector = MockConnector::new("https://api.example.com/v1");

		connector.mock().push_response(MockResponse::ok());

		let request = StubRequest::post("widgets")
			.with_body(Body::Form(vec![("name".into(), "sprocket".into())]));
		let response = connector.send(&request).await.expect("Dispatch should succeed.");

		assert!(response.is_success());

		let received = connector.mock().last_received().expect("Sender should record.");

		assert_eq!(received.method, Method::POST);
		assert_eq!(received.url.path(), "/v1/widgets");
		assert!(matches!(received.body, Body::Form(ref pairs) if pairs.len() == 1));
	}
}
