//! Terminal transport seam for the pipeline.
//!
//! A [`Sender`] turns a fully-assembled [`PendingRequest`] into a [`Response`] via the
//! actual transport layer. The pipeline appends it as the final stage of every run:
//! it executes only once the middleware snapshot is exhausted, so user-registered
//! middleware can never be inserted after it. Implementations own no per-run state.

mod mock;

pub use mock::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use http::header::{CONTENT_TYPE, HeaderValue};
// self
use crate::{_prelude::*, request::PendingRequest, response::Response};
#[cfg(feature = "reqwest")]
use crate::{
	error::{ConfigError, TransportError},
	request::Body,
};

/// Boxed future returned by [`Sender::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + 'a + Send>>;

/// Transport abstraction invoked as the terminal step of every pipeline run.
///
/// Implementations return a [`Response`] for every HTTP status they receive;
/// converting error statuses into failures is a middleware concern (see
/// [`builtin::ErrorForStatus`](crate::pipeline::builtin::ErrorForStatus)). Transport
/// failures - including cancellation and timeouts - surface as
/// [`TransportError`](crate::error::TransportError) and propagate through enclosing
/// middlewares exactly like any other error.
pub trait Sender
where
	Self: Send + Sync,
{
	/// Performs the transport call for `ctx`.
	fn send<'a>(&'a self, ctx: PendingRequest) -> SendFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] serving as the crate's default transport.
///
/// JSON and form bodies are serialized here, immediately before the wire, with the
/// matching `Content-Type` applied when the request carries none.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestSender(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestSender {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestSender {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestSender {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Sender for ReqwestSender {
	fn send<'a>(&'a self, ctx: PendingRequest) -> SendFuture<'a> {
		let client = self.0.clone();

		Box::pin(async move {
			let PendingRequest { method, url, mut headers, body, timeout } = ctx;

			if let Some(content_type) = body.default_content_type()
				&& !headers.contains_key(CONTENT_TYPE)
			{
				headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
			}

			let mut builder = client.request(method, url).headers(headers);

			match body {
				Body::Empty => (),
				Body::Bytes(bytes) => builder = builder.body(bytes),
				Body::Json(value) =>
					builder =
						builder.body(serde_json::to_vec(&value).map_err(ConfigError::from)?),
				Body::Form(pairs) => builder = builder.body(encode_form(&pairs)),
			}
			if let Some(timeout) = timeout
				&& let Ok(timeout) = std::time::Duration::try_from(timeout)
			{
				builder = builder.timeout(timeout);
			}

			let request = builder.build().map_err(ConfigError::http_client_build)?;
			let response = client.execute(request).await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let url = response.url().clone();
			let body = response.bytes().await.map_err(TransportError::from)?;

			Ok(Response::new(status, headers, url, body))
		})
	}
}

#[cfg(feature = "reqwest")]
fn encode_form(pairs: &[(String, String)]) -> String {
	url::form_urlencoded::Serializer::new(String::new())
		.extend_pairs(pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())))
		.finish()
}
