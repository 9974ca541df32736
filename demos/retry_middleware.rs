//! Demonstrates shaping a connector's pipeline: a named header stamp, the built-in
//! retry policy, and error-status conversion, exercised against the mock transport.

// crates.io
use color_eyre::Result;
use http::{HeaderName, StatusCode};
use url::Url;
// self
use courier::{
	connector::Connector,
	pipeline::{
		Middleware, MiddlewareFuture, Next, PipelineEntry, PipelineHandle,
		builtin::{ErrorForStatus, Retry},
	},
	request::{PendingRequest, Request},
	sender::{MockResponse, MockSender, Sender},
};

struct DemoConnector {
	base_url: Url,
	sender: MockSender,
	pipeline: PipelineHandle,
}
impl Connector for DemoConnector {
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

struct ListUsers;
impl Request for ListUsers {
	fn method(&self) -> http::Method {
		http::Method::GET
	}

	fn endpoint(&self) -> String {
		"users".into()
	}
}

/// Stamps a correlation header onto every outgoing request.
struct Correlate;
impl Middleware for Correlate {
	fn handle<'a>(&'a self, mut ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a> {
		Box::pin(async move {
			ctx.insert_header(HeaderName::from_static("x-correlation-id"), "demo-4217")
				.map_err(courier::error::Error::from)?;

			next.run(ctx).await
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let connector = DemoConnector {
		base_url: Url::parse("https://api.example.com/v1")?,
		sender: MockSender::with_responses([
			// First attempt dies on the wire; the retry stage runs the chain again.
			MockResponse::network_failure(),
			MockResponse::json(
				StatusCode::OK,
				&serde_json::json!([{ "id": 1, "login": "octocat" }]),
			),
		]),
		pipeline: PipelineHandle::default(),
	};

	connector.pipeline().push_named("correlate", Correlate)?;
	connector.pipeline().push_after("correlate", PipelineEntry::named("retry", Retry::new(2)))?;
	connector.pipeline().push(ErrorForStatus);

	println!("Registered stages: {:?}.", connector.pipeline().names());

	let response = connector.send(&ListUsers).await?;

	println!("Response after one retry: {} {}.", response.status(), response.text());

	for received in connector.sender.received() {
		println!(
			"Terminal saw {} {} with correlation id {:?}.",
			received.method,
			received.url,
			received.headers.get("x-correlation-id")
		);
	}

	// Dropping the retry stage restores fail-fast behavior for the next dispatch.
	connector.pipeline().remove("retry")?;
	connector.sender.push_response(MockResponse::network_failure());

	match connector.send(&ListUsers).await {
		Ok(_) => println!("Unexpected success without the retry stage."),
		Err(e) => println!("Without the retry stage the failure surfaces: {e}."),
	}

	Ok(())
}
