//! Response value type produced by the terminal sender.

// crates.io
use http::header::AsHeaderName;
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::StatusError};

/// Response produced by the terminal sender, or substituted early by a middleware.
///
/// The value flows back up the composed chain unchanged unless a middleware transforms
/// it. Senders return responses for every status; converting error statuses into
/// failures is an explicit step via [`Response::error_for_status`].
#[derive(Clone)]
pub struct Response {
	status: StatusCode,
	headers: HeaderMap,
	url: Url,
	body: Bytes,
}
impl Response {
	/// Assembles a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: impl Into<Bytes>) -> Self {
		Self { status, headers, url, body: body.into() }
	}

	/// Status code of the response.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Returns whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Final URL the response was served from.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// All response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// First value of the named header, when present and valid UTF-8.
	pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Raw response body.
	pub fn body(&self) -> &Bytes {
		&self.body
	}

	/// Body decoded as UTF-8 text, with invalid sequences replaced.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Body decoded as JSON into `T`, reporting the failing path on decode errors.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source })
	}

	/// Converts a client- or server-error status into [`Error::Status`], keeping the
	/// full response inside the error so an outer middleware can recover it.
	pub fn error_for_status(self) -> Result<Self> {
		if self.status.is_client_error() || self.status.is_server_error() {
			Err(StatusError { status: self.status, response: self }.into())
		} else {
			Ok(self)
		}
	}
}
impl Debug for Response {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Response")
			.field("status", &self.status)
			.field("url", &self.url.as_str())
			.field("body_len", &self.body.len())
			.finish()
	}
}
