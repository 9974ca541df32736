//! Crate-level error types shared across the pipeline, senders, and OAuth flows.

// self
use crate::{_prelude::*, response::Response};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Pipeline registry mutation failure.
	#[error(transparent)]
	Pipeline(#[from] PipelineError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure raised by the terminal sender.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response carried a client or server error status.
	#[error(transparent)]
	Status(#[from] StatusError),
	/// OAuth flow failure.
	#[error(transparent)]
	OAuth(#[from] OAuthError),

	/// Response body could not be decoded.
	#[error("Response body could not be decoded as JSON.")]
	Decode {
		/// Structured decoding failure with the path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Opaque error raised by a middleware.
	#[error("Middleware raised an error.")]
	Middleware {
		/// Middleware-specific failure.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a middleware-specific error inside [`Error::Middleware`].
	pub fn middleware(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Middleware { source: Box::new(src) }
	}
}

/// Registry mutation failures raised by pipeline operations.
///
/// These fail fast at the offending call and leave the middleware sequence untouched.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum PipelineError {
	/// A named entry with the same name is already registered.
	#[error("Middleware named `{name}` is already registered.")]
	DuplicateName {
		/// Name that collided with an existing entry.
		name: String,
	},
	/// No entry with the referenced name exists.
	#[error("Middleware named `{name}` is not registered.")]
	NotFound {
		/// Name that failed to resolve.
		name: String,
	},
}

/// Transport-level failures raised by the terminal sender.
///
/// The pipeline never interprets these; they propagate through enclosing middlewares
/// like any other error.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying transport reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded its deadline.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Error-status conversion produced by [`Response::error_for_status`].
///
/// The full response stays inside the error so outer middlewares can recover it and
/// substitute it back as a result.
#[derive(Debug, ThisError)]
#[error("Request to `{}` failed with status {status}.", response.url())]
pub struct StatusError {
	/// Status code that triggered the conversion.
	pub status: StatusCode,
	/// Complete response retained for recovery.
	pub response: Response,
}
impl StatusError {
	/// Releases the retained response, discarding the error wrapper.
	pub fn into_response(self) -> Response {
		self.response
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request could not be constructed by the transport.
	#[error("HTTP request could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint could not be resolved into a valid URL.
	#[error("Endpoint `{endpoint}` could not be resolved into a valid URL.")]
	InvalidUrl {
		/// Endpoint string that failed to resolve.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name contained characters that are not legal in HTTP headers.
	#[error("Header name is invalid.")]
	InvalidHeaderName(#[from] http::header::InvalidHeaderName),
	/// Header value contained bytes that are not legal in HTTP headers.
	#[error("Header value is invalid.")]
	InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[from] serde_json::Error),
	/// Mock sender ran out of canned responses.
	#[error("Mock sender response queue is empty.")]
	MockQueueEmpty,
	/// OAuth configuration is incomplete.
	#[error(transparent)]
	OAuthConfig(#[from] OAuthConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Validation failures raised by [`OAuthConfig`](crate::oauth2::OAuthConfig).
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum OAuthConfigError {
	/// Client identifier is empty.
	#[error("OAuth configuration is missing the client identifier.")]
	MissingClientId,
	/// Client secret is empty.
	#[error("OAuth configuration is missing the client secret.")]
	MissingClientSecret,
	/// Redirect URI is empty.
	#[error("OAuth configuration is missing the redirect URI.")]
	MissingRedirectUri,
}

/// OAuth flow failures.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum OAuthError {
	/// Returned `state` parameter differs from the one issued for the session.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned a non-positive `expires_in`.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
