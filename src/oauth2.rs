//! OAuth 2.0 authorization-code-grant support layered on top of the connector API.
//!
//! The grant layer is an ordinary consumer of [`Connector::send`]: token requests
//! travel through the connector's own pipeline and sender, so registered middleware
//! (logging, retries) applies to them like to any other request.

pub mod session;

pub use session::*;

// crates.io
use serde::Deserialize;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenAuthenticator, TokenSecret},
	connector::{Connector, join_url},
	error::{ConfigError, OAuthConfigError, OAuthError},
	request::{Body, Request},
	response::Response,
};

/// Boxed future returned by the provided grant flow methods.
pub type FlowFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// OAuth 2.0 client configuration consumed by [`AuthorizationCodeGrant`].
///
/// Endpoints are resolved against the connector's base URL unless given as absolute
/// URLs. There is deliberately no token store here; persisting the issued
/// [`AccessTokenAuthenticator`] is the caller's concern.
#[derive(Clone, Debug)]
pub struct OAuthConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret sent with token requests.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the provider.
	pub redirect_uri: String,
	/// Authorize endpoint, relative to the connector base URL or absolute.
	pub authorize_endpoint: String,
	/// Token endpoint, relative to the connector base URL or absolute.
	pub token_endpoint: String,
	/// User-info endpoint, relative to the connector base URL or absolute.
	pub user_endpoint: String,
	/// Scopes requested on every authorization, ahead of per-call extras.
	pub default_scopes: Vec<String>,
	/// Separator joining scopes into the `scope` parameter.
	pub scope_separator: char,
	/// Enables PKCE (RFC 7636, S256) on authorization and exchange.
	pub pkce: bool,
}
impl OAuthConfig {
	/// Creates a configuration with the conventional `authorize`/`token`/`user`
	/// endpoints, a space scope separator, and PKCE disabled.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<TokenSecret>,
		redirect_uri: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			redirect_uri: redirect_uri.into(),
			authorize_endpoint: "authorize".into(),
			token_endpoint: "token".into(),
			user_endpoint: "user".into(),
			default_scopes: Vec::new(),
			scope_separator: ' ',
			pkce: false,
		}
	}

	/// Overrides the authorize endpoint.
	pub fn with_authorize_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.authorize_endpoint = endpoint.into();

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.token_endpoint = endpoint.into();

		self
	}

	/// Overrides the user-info endpoint.
	pub fn with_user_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.user_endpoint = endpoint.into();

		self
	}

	/// Sets the scopes requested on every authorization.
	pub fn with_default_scopes(
		mut self,
		scopes: impl IntoIterator<Item = impl Into<String>>,
	) -> Self {
		self.default_scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the scope separator (defaults to a space).
	pub fn with_scope_separator(mut self, separator: char) -> Self {
		self.scope_separator = separator;

		self
	}

	/// Toggles PKCE on authorization and exchange.
	pub fn with_pkce(mut self, pkce: bool) -> Self {
		self.pkce = pkce;

		self
	}

	/// Validates that the credential triple is present.
	///
	/// Flow methods validate before sending, so a half-built configuration fails at
	/// the first use rather than with a provider error.
	pub fn validate(&self) -> Result<(), OAuthConfigError> {
		if self.client_id.is_empty() {
			return Err(OAuthConfigError::MissingClientId);
		}
		if self.client_secret.expose().is_empty() {
			return Err(OAuthConfigError::MissingClientSecret);
		}
		if self.redirect_uri.is_empty() {
			return Err(OAuthConfigError::MissingRedirectUri);
		}

		Ok(())
	}

	fn merged_scope(&self, extra: &[&str]) -> String {
		let mut buf = String::new();

		for scope in self.default_scopes.iter().map(String::as_str).chain(extra.iter().copied()) {
			if !buf.is_empty() {
				buf.push(self.scope_separator);
			}

			buf.push_str(scope);
		}

		buf
	}
}

/// Authorization-code-grant flows for a [`Connector`].
///
/// Implementors supply the configuration; every flow method has a provided
/// implementation built on [`Connector::send`].
pub trait AuthorizationCodeGrant
where
	Self: Connector,
{
	/// OAuth configuration for the connector's provider.
	fn oauth_config(&self) -> &OAuthConfig;

	/// Starts an authorization with a freshly generated 32-character state.
	fn start_authorization(&self, scopes: &[&str]) -> Result<AuthorizationSession>
	where
		Self: Sized,
	{
		self.start_authorization_with_state(scopes, session::random_state())
	}

	/// Starts an authorization with a caller-supplied state.
	///
	/// Builds the authorize URL with `response_type=code`, the client identifier,
	/// redirect URI, merged scopes, and state; a PKCE challenge pair is generated and
	/// appended when the configuration enables it. The state (and PKCE verifier) live
	/// in the returned [`AuthorizationSession`], not on the connector.
	fn start_authorization_with_state(
		&self,
		scopes: &[&str],
		state: impl Into<String>,
	) -> Result<AuthorizationSession>
	where
		Self: Sized,
	{
		let config = self.oauth_config();

		config.validate().map_err(ConfigError::from)?;

		let mut authorize_url = join_url(&self.base_url(), &config.authorize_endpoint)?;
		let state = state.into();
		let scope = config.merged_scope(scopes);
		let pkce = config.pkce.then(PkcePair::generate);

		{
			let mut pairs = authorize_url.query_pairs_mut();

			pairs.append_pair("response_type", "code");
			pairs.append_pair("client_id", &config.client_id);
			pairs.append_pair("redirect_uri", &config.redirect_uri);

			if !scope.is_empty() {
				pairs.append_pair("scope", &scope);
			}

			pairs.append_pair("state", &state);

			if let Some(pkce) = &pkce {
				pairs.append_pair("code_challenge", pkce.challenge());
				pairs.append_pair("code_challenge_method", pkce.method().as_str());
			}
		}

		Ok(AuthorizationSession::new(state, authorize_url, pkce))
	}

	/// Exchanges the authorization code returned to the redirect URI for tokens.
	///
	/// Callers should have checked the redirect's state via
	/// [`AuthorizationSession::validate_state`] first. The request is form-encoded
	/// with `grant_type=authorization_code` (plus `code_verifier` under PKCE), raises
	/// on error statuses, and parses the provider's token response.
	fn exchange_code<'a>(
		&'a self,
		session: AuthorizationSession,
		code: impl Into<String>,
	) -> FlowFuture<'a, AccessTokenAuthenticator>
	where
		Self: Sized,
	{
		let code = code.into();

		Box::pin(async move {
			let config = self.oauth_config();

			config.validate().map_err(ConfigError::from)?;

			let mut form = vec![
				("grant_type".to_owned(), "authorization_code".to_owned()),
				("client_id".to_owned(), config.client_id.clone()),
				("client_secret".to_owned(), config.client_secret.expose().to_owned()),
				("redirect_uri".to_owned(), config.redirect_uri.clone()),
				("code".to_owned(), code),
			];

			if let Some(verifier) = session.pkce_verifier() {
				form.push(("code_verifier".to_owned(), verifier.to_owned()));
			}

			let request = TokenRequest { endpoint: config.token_endpoint.clone(), form };
			let response = self.send(&request).await?.error_for_status()?;

			parse_token_response(&response, None)
		})
	}

	/// Exchanges a refresh token for a fresh access token.
	///
	/// When the provider rotates without returning a new refresh token, the request's
	/// refresh token is carried over into the result.
	fn refresh_access_token<'a>(
		&'a self,
		refresh_token: impl Into<TokenSecret>,
	) -> FlowFuture<'a, AccessTokenAuthenticator>
	where
		Self: Sized,
	{
		let refresh_token = refresh_token.into();

		Box::pin(async move {
			let config = self.oauth_config();

			config.validate().map_err(ConfigError::from)?;

			let form = vec![
				("grant_type".to_owned(), "refresh_token".to_owned()),
				("client_id".to_owned(), config.client_id.clone()),
				("client_secret".to_owned(), config.client_secret.expose().to_owned()),
				("refresh_token".to_owned(), refresh_token.expose().to_owned()),
			];
			let request = TokenRequest { endpoint: config.token_endpoint.clone(), form };
			let response = self.send(&request).await?.error_for_status()?;

			parse_token_response(&response, Some(refresh_token))
		})
	}

	/// Fetches the authenticated user from the configured user-info endpoint.
	///
	/// Returns the raw response; decoding it into a domain type is the caller's
	/// concern.
	fn fetch_user<'a>(
		&'a self,
		authenticator: &AccessTokenAuthenticator,
	) -> FlowFuture<'a, Response>
	where
		Self: Sized,
	{
		let request = UserRequest {
			endpoint: self.oauth_config().user_endpoint.clone(),
			authenticator: authenticator.clone(),
		};

		Box::pin(async move { self.send(&request).await })
	}
}

struct TokenRequest {
	endpoint: String,
	form: Vec<(String, String)>,
}
impl Request for TokenRequest {
	fn method(&self) -> Method {
		Method::POST
	}

	fn endpoint(&self) -> String {
		self.endpoint.clone()
	}

	fn headers(&self) -> Vec<(String, String)> {
		vec![("accept".into(), "application/json".into())]
	}

	fn body(&self) -> Result<Body> {
		Ok(Body::Form(self.form.clone()))
	}
}

struct UserRequest {
	endpoint: String,
	authenticator: AccessTokenAuthenticator,
}
impl Request for UserRequest {
	fn method(&self) -> Method {
		Method::GET
	}

	fn endpoint(&self) -> String {
		self.endpoint.clone()
	}

	fn authenticator(&self) -> Option<&dyn crate::auth::Authenticator> {
		Some(&self.authenticator)
	}
}

#[derive(Deserialize)]
struct TokenPayload {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}

fn parse_token_response(
	response: &Response,
	fallback_refresh_token: Option<TokenSecret>,
) -> Result<AccessTokenAuthenticator> {
	let payload = response.json::<TokenPayload>()?;
	let expires_in = payload.expires_in.ok_or(OAuthError::MissingExpiresIn)?;

	if expires_in <= 0 {
		return Err(OAuthError::NonPositiveExpiresIn.into());
	}

	Ok(AccessTokenAuthenticator {
		access_token: TokenSecret::new(payload.access_token),
		refresh_token: payload.refresh_token.map(TokenSecret::new).or(fallback_refresh_token),
		expires_at: OffsetDateTime::now_utc() + Duration::seconds(expires_in),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> OAuthConfig {
		OAuthConfig::new("client-id", "client-secret", "https://app.example.com/cb")
	}

	fn token_response(body: &str) -> Response {
		Response::new(
			StatusCode::OK,
			HeaderMap::new(),
			Url::parse("https://id.example.com/token").expect("Fixture URL should parse."),
			body.as_bytes().to_vec(),
		)
	}

	#[test]
	fn validate_reports_the_first_missing_field() {
		assert_eq!(
			OAuthConfig::new("", "secret", "uri").validate(),
			Err(OAuthConfigError::MissingClientId)
		);
		assert_eq!(
			OAuthConfig::new("id", "", "uri").validate(),
			Err(OAuthConfigError::MissingClientSecret)
		);
		assert_eq!(
			OAuthConfig::new("id", "secret", "").validate(),
			Err(OAuthConfigError::MissingRedirectUri)
		);
		assert_eq!(config().validate(), Ok(()));
	}

	#[test]
	fn merged_scope_respects_the_separator() {
		let config = config().with_default_scopes(["openid", "profile"]).with_scope_separator(',');

		assert_eq!(config.merged_scope(&["email"]), "openid,profile,email");
		assert_eq!(config.merged_scope(&[]), "openid,profile");
		assert_eq!(
			OAuthConfig::new("id", "secret", "uri").merged_scope(&[]),
			"",
		);
	}

	#[test]
	fn token_parsing_requires_a_positive_expires_in() {
		let err = parse_token_response(&token_response(r#"{"access_token":"a"}"#), None)
			.expect_err("Missing expires_in should fail.");

		assert!(matches!(err, Error::OAuth(OAuthError::MissingExpiresIn)));

		let err = parse_token_response(
			&token_response(r#"{"access_token":"a","expires_in":-30}"#),
			None,
		)
		.expect_err("Negative expires_in should fail.");

		assert!(matches!(err, Error::OAuth(OAuthError::NonPositiveExpiresIn)));
	}

	#[test]
	fn token_parsing_falls_back_to_the_request_refresh_token() {
		let authenticator = parse_token_response(
			&token_response(r#"{"access_token":"a","expires_in":3600}"#),
			Some(TokenSecret::new("previous-refresh")),
		)
		.expect("Rotation-less refresh should parse.");

		assert_eq!(
			authenticator.refresh_token.as_ref().map(TokenSecret::expose),
			Some("previous-refresh")
		);

		let authenticator = parse_token_response(
			&token_response(r#"{"access_token":"a","refresh_token":"rotated","expires_in":60}"#),
			Some(TokenSecret::new("previous-refresh")),
		)
		.expect("Rotated refresh should parse.");

		assert_eq!(
			authenticator.refresh_token.as_ref().map(TokenSecret::expose),
			Some("rotated")
		);
	}
}
