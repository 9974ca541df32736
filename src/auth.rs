//! Authenticator seam plus the credential types it works with.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::header::AUTHORIZATION;
// self
use crate::{_prelude::*, request::PendingRequest};

/// Applies credentials to an assembled [`PendingRequest`].
///
/// Authenticators run last during request assembly, after connector defaults and
/// request-specific headers/query pairs, so the credential always wins.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// Mutates `ctx` so the request carries the credential.
	fn authenticate(&self, ctx: &mut PendingRequest) -> Result<()>;
}

/// Redacted secret wrapper keeping credential material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// Sets the `Authorization` header to `<prefix> <token>`, `Bearer` by default.
#[derive(Clone, Debug)]
pub struct TokenAuthenticator {
	token: TokenSecret,
	prefix: String,
}
impl TokenAuthenticator {
	/// Creates a bearer-token authenticator.
	pub fn new(token: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), prefix: "Bearer".into() }
	}

	/// Overrides the header prefix; an empty prefix sends the bare token.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();

		self
	}
}
impl Authenticator for TokenAuthenticator {
	fn authenticate(&self, ctx: &mut PendingRequest) -> Result<()> {
		let value = if self.prefix.is_empty() {
			self.token.expose().to_owned()
		} else {
			format!("{} {}", self.prefix, self.token.expose())
		};

		ctx.insert_sensitive_header(AUTHORIZATION, &value)?;

		Ok(())
	}
}

/// Sets the `Authorization` header to RFC 7617 `Basic` credentials.
#[derive(Clone, Debug)]
pub struct BasicAuthenticator {
	username: String,
	password: TokenSecret,
}
impl BasicAuthenticator {
	/// Creates a basic-auth authenticator for the given credentials.
	pub fn new(username: impl Into<String>, password: impl Into<TokenSecret>) -> Self {
		Self { username: username.into(), password: password.into() }
	}
}
impl Authenticator for BasicAuthenticator {
	fn authenticate(&self, ctx: &mut PendingRequest) -> Result<()> {
		let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password.expose()));

		ctx.insert_sensitive_header(AUTHORIZATION, &format!("Basic {encoded}"))?;

		Ok(())
	}
}

/// Appends the credential as a query pair, for APIs keyed by `?api_key=`.
#[derive(Clone, Debug)]
pub struct QueryAuthenticator {
	key: String,
	value: TokenSecret,
}
impl QueryAuthenticator {
	/// Creates a query-parameter authenticator.
	pub fn new(key: impl Into<String>, value: impl Into<TokenSecret>) -> Self {
		Self { key: key.into(), value: value.into() }
	}
}
impl Authenticator for QueryAuthenticator {
	fn authenticate(&self, ctx: &mut PendingRequest) -> Result<()> {
		ctx.append_query(&self.key, self.value.expose());

		Ok(())
	}
}

/// Access token issued by an OAuth 2.0 token endpoint.
///
/// The value doubles as a bearer [`Authenticator`] and serializes cleanly so callers
/// can stash it wherever they keep session material.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessTokenAuthenticator {
	/// Access token presented as a bearer credential.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant after which the access token is no longer valid.
	pub expires_at: OffsetDateTime,
}
impl AccessTokenAuthenticator {
	/// Returns whether the access token has expired as of now.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns whether the access token has expired as of `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at <= instant
	}
}
impl Authenticator for AccessTokenAuthenticator {
	fn authenticate(&self, ctx: &mut PendingRequest) -> Result<()> {
		ctx.insert_sensitive_header(
			AUTHORIZATION,
			&format!("Bearer {}", self.access_token.expose()),
		)?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> PendingRequest {
		PendingRequest::new(
			Method::GET,
			Url::parse("https://api.example.com/me").expect("Fixture URL should parse."),
		)
	}

	fn authorization(ctx: &PendingRequest) -> &str {
		ctx.headers
			.get(AUTHORIZATION)
			.expect("Authorization header should be set.")
			.to_str()
			.expect("Authorization header should be valid UTF-8.")
	}

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn token_authenticator_defaults_to_bearer() {
		let mut ctx = request();

		TokenAuthenticator::new("abc123")
			.authenticate(&mut ctx)
			.expect("Bearer token should apply.");

		assert_eq!(authorization(&ctx), "Bearer abc123");
	}

	#[test]
	fn token_authenticator_prefix_is_overridable() {
		let mut ctx = request();

		TokenAuthenticator::new("abc123")
			.with_prefix("")
			.authenticate(&mut ctx)
			.expect("Bare token should apply.");

		assert_eq!(authorization(&ctx), "abc123");
	}

	#[test]
	fn basic_authenticator_encodes_credentials() {
		let mut ctx = request();

		BasicAuthenticator::new("user", "password")
			.authenticate(&mut ctx)
			.expect("Basic credentials should apply.");

		// base64("user:password")
		assert_eq!(authorization(&ctx), "Basic dXNlcjpwYXNzd29yZA==");
	}

	#[test]
	fn query_authenticator_appends_a_pair() {
		let mut ctx = request();

		QueryAuthenticator::new("api_key", "k-123")
			.authenticate(&mut ctx)
			.expect("Query credential should apply.");

		assert_eq!(ctx.url.query(), Some("api_key=k-123"));
	}

	#[test]
	fn access_token_expiry_is_boundary_inclusive() {
		let now = OffsetDateTime::now_utc();
		let authenticator = AccessTokenAuthenticator {
			access_token: TokenSecret::new("access"),
			refresh_token: None,
			expires_at: now,
		};

		assert!(authenticator.is_expired_at(now));
		assert!(!authenticator.is_expired_at(now - Duration::seconds(1)));
	}
}
