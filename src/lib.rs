//! Connector-first HTTP client SDK—define connectors and requests once, dispatch them
//! through a reorderable middleware pipeline, and layer OAuth 2.0 authorization-code
//! flows on top.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod connector;
pub mod error;
pub mod oauth2;
pub mod obs;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod sender;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for test suites; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	pub use crate::sender::{MockResponse, MockSender};

	// self
	use crate::{
		auth::Authenticator,
		connector::Connector,
		pipeline::PipelineHandle,
		request::{Body, Request},
		sender::Sender,
	};

	/// Builds a [`MockSender`] preloaded with the given replies.
	pub fn mock_sender_with(responses: impl IntoIterator<Item = MockResponse>) -> MockSender {
		MockSender::with_responses(responses)
	}

	/// Builds a [`ReqwestSender`] that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_sender() -> crate::sender::ReqwestSender {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		crate::sender::ReqwestSender::with_client(client)
	}

	/// Connector fixture backed by a [`MockSender`].
	pub struct MockConnector {
		base_url: Url,
		sender: MockSender,
		pipeline: PipelineHandle,
		default_headers: Vec<(String, String)>,
		default_query: Vec<(String, String)>,
		authenticator: Option<Arc<dyn Authenticator>>,
	}
	impl MockConnector {
		/// Creates a connector for the given base URL with an empty pipeline.
		pub fn new(base_url: &str) -> Self {
			Self {
				base_url: Url::parse(base_url).expect("Base URL fixture should parse."),
				sender: MockSender::default(),
				pipeline: PipelineHandle::default(),
				default_headers: Vec::new(),
				default_query: Vec::new(),
				authenticator: None,
			}
		}

		/// Direct access to the backing mock transport.
		pub fn mock(&self) -> &MockSender {
			&self.sender
		}

		/// Adds a connector-wide default header.
		pub fn with_default_header(
			mut self,
			name: impl Into<String>,
			value: impl Into<String>,
		) -> Self {
			self.default_headers.push((name.into(), value.into()));

			self
		}

		/// Adds a connector-wide default query pair.
		pub fn with_default_query(
			mut self,
			key: impl Into<String>,
			value: impl Into<String>,
		) -> Self {
			self.default_query.push((key.into(), value.into()));

			self
		}

		/// Sets the connector-wide authenticator.
		pub fn with_authenticator(mut self, authenticator: impl 'static + Authenticator) -> Self {
			self.authenticator = Some(Arc::new(authenticator));

			self
		}
	}
	impl Connector for MockConnector {
		fn base_url(&self) -> Url {
			self.base_url.clone()
		}

		fn sender(&self) -> &dyn Sender {
			&self.sender
		}

		fn pipeline(&self) -> &PipelineHandle {
			&self.pipeline
		}

		fn default_headers(&self) -> Vec<(String, String)> {
			self.default_headers.clone()
		}

		fn default_query(&self) -> Vec<(String, String)> {
			self.default_query.clone()
		}

		fn authenticator(&self) -> Option<&dyn Authenticator> {
			self.authenticator.as_deref()
		}
	}

	/// Request fixture assembled field by field.
	pub struct StubRequest {
		method: Method,
		endpoint: String,
		headers: Vec<(String, String)>,
		query: Vec<(String, String)>,
		body: Body,
		timeout: Option<Duration>,
		authenticator: Option<Arc<dyn Authenticator>>,
	}
	impl StubRequest {
		/// Creates a GET request for `endpoint`.
		pub fn get(endpoint: &str) -> Self {
			Self::new(Method::GET, endpoint)
		}

		/// Creates a POST request for `endpoint`.
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

		/// Adds a request header.
		pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
			self.headers.push((name.into(), value.into()));

			self
		}

		/// Adds a request query pair.
		pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
			self.query.push((key.into(), value.into()));

			self
		}

		/// Sets the request body.
		pub fn with_body(mut self, body: Body) -> Self {
			self.body = body;

			self
		}

		/// Sets the request timeout.
		pub fn with_timeout(mut self, timeout: Duration) -> Self {
			self.timeout = Some(timeout);

			self
		}

		/// Sets the request authenticator.
		pub fn with_authenticator(mut self, authenticator: impl 'static + Authenticator) -> Self {
			self.authenticator = Some(Arc::new(authenticator));

			self
		}
	}
	impl Request for StubRequest {
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

		fn body(&self) -> Result<Body> {
			Ok(self.body.clone())
		}

		fn timeout(&self) -> Option<Duration> {
			self.timeout
		}

		fn authenticator(&self) -> Option<&dyn Authenticator> {
			self.authenticator.as_deref()
		}
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use bytes::Bytes;
	pub use http::{HeaderMap, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
