//! Demonstrates plugging a custom transport into a connector.
//!
//! 1. Implement [`Sender`] for your transport; return a [`Response`] for every status
//!    you receive and reserve errors for transport-level failures.
//! 2. Map your transport's failures into [`TransportError`] so retry policies and
//!    recovery middleware treat them uniformly.
//! 3. Hand the transport to the connector; the pipeline neither knows nor cares what
//!    sits behind the terminal seam.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
};
// crates.io
use color_eyre::Result;
use http::{HeaderMap, StatusCode};
use url::Url;
// self
use courier::{
	connector::Connector,
	error::TransportError,
	pipeline::{PipelineHandle, builtin::Retry},
	request::{PendingRequest, Request},
	response::Response,
	sender::{SendFuture, Sender},
};

#[derive(Clone, Debug)]
struct DnsFailure {
	host: String,
}
impl Display for DnsFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "DNS lookup failed for {}", self.host)
	}
}
impl StdError for DnsFailure {}

#[derive(Clone)]
enum Behavior {
	Route,
	FailOnce,
}

/// Transport that routes requests against an in-memory table instead of a network.
struct InMemorySender {
	behavior: std::sync::Mutex<Behavior>,
}
impl InMemorySender {
	fn new(behavior: Behavior) -> Self {
		Self { behavior: std::sync::Mutex::new(behavior) }
	}

	fn route(ctx: &PendingRequest) -> Response {
		let (status, body) = match ctx.url.path() {
			"/v1/health" => (StatusCode::OK, r#"{"status":"healthy"}"#),
			"/v1/users" => (StatusCode::OK, r#"[{"id":1,"login":"octocat"}]"#),
			_ => (StatusCode::NOT_FOUND, r#"{"error":"no such route"}"#),
		};

		Response::new(status, HeaderMap::new(), ctx.url.clone(), body)
	}
}
impl Sender for InMemorySender {
	fn send<'a>(&'a self, ctx: PendingRequest) -> SendFuture<'a> {
		Box::pin(async move {
			let mut behavior = self.behavior.lock().expect("Behavior lock should not poison.");

			if let Behavior::FailOnce = *behavior {
				*behavior = Behavior::Route;

				return Err(TransportError::network(DnsFailure {
					host: ctx.url.host_str().unwrap_or("unknown").to_owned(),
				})
				.into());
			}

			drop(behavior);

			Ok(Self::route(&ctx))
		})
	}
}

struct DemoConnector {
	base_url: Url,
	sender: InMemorySender,
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

struct Health;
impl Request for Health {
	fn method(&self) -> http::Method {
		http::Method::GET
	}

	fn endpoint(&self) -> String {
		"health".into()
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let connector = DemoConnector {
		base_url: Url::parse("https://api.example.com/v1")?,
		sender: InMemorySender::new(Behavior::FailOnce),
		pipeline: PipelineHandle::default(),
	};

	// The first attempt fails with the mapped DNS error; the retry stage recovers it.
	connector.pipeline().push(Retry::new(1));

	let response = connector.send(&Health).await?;

	println!("Health check over the in-memory transport: {}.", response.text());

	// Without a retry stage the mapped error reaches the caller directly.
	let bare = DemoConnector {
		base_url: Url::parse("https://api.example.com/v1")?,
		sender: InMemorySender::new(Behavior::FailOnce),
		pipeline: PipelineHandle::default(),
	};

	match bare.send(&Health).await {
		Ok(_) => println!("In-memory transport unexpectedly succeeded."),
		Err(e) => println!("Transport error surfaced to the caller: {e}."),
	}

	Ok(())
}
