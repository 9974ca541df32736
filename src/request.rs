//! Request context passed through the pipeline plus the [`Request`] trait that
//! describes a single endpoint.

// crates.io
use http::{HeaderName, HeaderValue, header::AUTHORIZATION};
// self
use crate::{_prelude::*, auth::Authenticator, error::ConfigError};

/// The in-flight request state passed through every pipeline stage.
///
/// Each [`run`](crate::pipeline::Pipeline::run) invocation owns exactly one of these;
/// middlewares receive it by value, may read and mutate it (change the target URL, add
/// headers, swap the body), and hand it onward to the continuation. Nothing can retain
/// it beyond the call.
#[derive(Clone)]
pub struct PendingRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully-resolved target URL including any query string.
	pub url: Url,
	/// Headers accumulated so far.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Body,
	/// Per-request deadline the sender should enforce, when set.
	pub timeout: Option<Duration>,
}
impl PendingRequest {
	/// Creates an empty-bodied request for the given method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: Body::Empty, timeout: None }
	}

	/// Inserts a header, replacing any previous value under the same name.
	pub fn insert_header(&mut self, name: HeaderName, value: &str) -> Result<(), ConfigError> {
		self.headers.insert(name, HeaderValue::from_str(value)?);

		Ok(())
	}

	/// Inserts a header carrying secret material; the value is marked sensitive so
	/// HTTP-layer debugging never prints it.
	pub fn insert_sensitive_header(
		&mut self,
		name: HeaderName,
		value: &str,
	) -> Result<(), ConfigError> {
		let mut value = HeaderValue::from_str(value)?;

		value.set_sensitive(true);
		self.headers.insert(name, value);

		Ok(())
	}

	/// Appends a query pair to the target URL.
	pub fn append_query(&mut self, key: &str, value: &str) {
		self.url.query_pairs_mut().append_pair(key, value);
	}
}
impl Debug for PendingRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PendingRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &RedactedHeaders(&self.headers))
			.field("body", &self.body)
			.field("timeout", &self.timeout)
			.finish()
	}
}

struct RedactedHeaders<'a>(&'a HeaderMap);
impl Debug for RedactedHeaders<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (name, value) in self.0 {
			if name == AUTHORIZATION || value.is_sensitive() {
				map.entry(&name.as_str(), &"<redacted>");
			} else {
				map.entry(&name.as_str(), &value.to_str().unwrap_or("<binary>"));
			}
		}

		map.finish()
	}
}

/// Request payload carried by a [`PendingRequest`].
///
/// JSON and form variants stay structured until the terminal sender serializes them;
/// middlewares and mock transports can therefore still inspect individual fields.
#[derive(Clone)]
pub enum Body {
	/// No payload.
	Empty,
	/// Raw bytes, sent as-is.
	Bytes(Bytes),
	/// JSON document, serialized by the sender with an `application/json` default
	/// content type.
	Json(serde_json::Value),
	/// Form pairs, URL-encoded by the sender with an
	/// `application/x-www-form-urlencoded` default content type.
	Form(Vec<(String, String)>),
}
impl Body {
	/// Returns whether the body carries no payload.
	pub fn is_empty(&self) -> bool {
		match self {
			Body::Empty => true,
			Body::Bytes(bytes) => bytes.is_empty(),
			Body::Json(_) => false,
			Body::Form(pairs) => pairs.is_empty(),
		}
	}

	/// Content type the sender applies when the request carries none.
	pub fn default_content_type(&self) -> Option<&'static str> {
		match self {
			Body::Json(_) => Some("application/json"),
			Body::Form(_) => Some("application/x-www-form-urlencoded"),
			Body::Empty | Body::Bytes(_) => None,
		}
	}
}
impl Debug for Body {
	// Form pairs routinely carry client secrets, so only the variant shape is printed.
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Body::Empty => f.write_str("Body::Empty"),
			Body::Bytes(bytes) => write!(f, "Body::Bytes({} bytes)", bytes.len()),
			Body::Json(_) => f.write_str("Body::Json(..)"),
			Body::Form(pairs) => write!(f, "Body::Form({} pairs)", pairs.len()),
		}
	}
}

/// Reusable description of one endpoint of an upstream API.
///
/// Implementations are plain value types; [`Connector::send`](crate::connector::Connector::send)
/// turns them into a [`PendingRequest`] by merging them with the connector's defaults.
pub trait Request
where
	Self: Send + Sync,
{
	/// HTTP method for the endpoint.
	fn method(&self) -> Method;

	/// Endpoint path relative to the connector's base URL, or an absolute URL that
	/// bypasses the base entirely.
	fn endpoint(&self) -> String;

	/// Request-specific headers, overlaying the connector's defaults.
	fn headers(&self) -> Vec<(String, String)> {
		Vec::new()
	}

	/// Request-specific query pairs, appended after the connector's defaults.
	fn query(&self) -> Vec<(String, String)> {
		Vec::new()
	}

	/// Request body.
	fn body(&self) -> Result<Body> {
		Ok(Body::Empty)
	}

	/// Per-request deadline.
	fn timeout(&self) -> Option<Duration> {
		None
	}

	/// Request-specific authenticator, taking precedence over the connector's.
	fn authenticator(&self) -> Option<&dyn Authenticator> {
		None
	}
}
