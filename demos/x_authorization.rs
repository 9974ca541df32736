//! Interactive Authorization Code + PKCE walkthrough for X (Twitter).
//!
//! The example prints the authorize URL, waits for the user to paste the returned
//! `state` and `code` parameters via stdin, optionally exchanges the code for tokens,
//! and can send a tweet so the bearer token is exercised end-to-end.

// std
use std::io::{self, Write};
// crates.io
use color_eyre::Result;
use serde_json::json;
use url::Url;
// self
use courier::{
	auth::{AccessTokenAuthenticator, Authenticator, TokenSecret},
	connector::Connector,
	oauth2::{AuthorizationCodeGrant, OAuthConfig},
	pipeline::PipelineHandle,
	request::{Body, Request},
	sender::{ReqwestSender, Sender},
};

struct XConnector {
	base_url: Url,
	sender: ReqwestSender,
	pipeline: PipelineHandle,
	oauth: OAuthConfig,
}
impl Connector for XConnector {
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
impl AuthorizationCodeGrant for XConnector {
	fn oauth_config(&self) -> &OAuthConfig {
		&self.oauth
	}
}

struct PostTweet {
	text: String,
	authenticator: AccessTokenAuthenticator,
}
impl Request for PostTweet {
	fn method(&self) -> http::Method {
		http::Method::POST
	}

	fn endpoint(&self) -> String {
		"2/tweets".into()
	}

	fn body(&self) -> courier::error::Result<Body> {
		Ok(Body::Json(json!({ "text": self.text })))
	}

	fn authenticator(&self) -> Option<&dyn Authenticator> {
		Some(&self.authenticator)
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = prompt_with_default("Enter your X client ID", Some("demo-x-client"))?;
	let client_secret = prompt_with_default(
		"Enter your X client secret",
		Some("demo-x-secret"),
	)?;
	let redirect_uri = prompt_with_default(
		"Enter the redirect URI registered with X",
		Some("https://app.example.com/x/callback"),
	)?;
	let connector = XConnector {
		base_url: Url::parse("https://api.x.com")?,
		sender: ReqwestSender::default(),
		pipeline: PipelineHandle::default(),
		oauth: OAuthConfig::new(client_id, TokenSecret::new(client_secret), redirect_uri)
			.with_authorize_endpoint("https://x.com/i/oauth2/authorize")
			.with_token_endpoint("2/oauth2/token")
			.with_user_endpoint("2/users/me")
			.with_default_scopes(["tweet.read", "tweet.write", "users.read", "offline.access"])
			.with_pkce(true),
	};
	let session = connector.start_authorization(&[])?;

	println!("Authorize URL: {}", &session.authorize_url);
	println!(
		"PKCE challenge ({:?}): {:?}.",
		session.code_challenge_method(),
		session.code_challenge()
	);
	println!(
		"After X redirects back to your app, copy the `state` and `code` query parameters and paste them here."
	);

	let returned_state = prompt_with_default(
		"State (press Enter to reuse the generated value)",
		Some(session.state.as_str()),
	)?;

	session.validate_state(&returned_state)?;

	let authorization_code =
		prompt_optional("Authorization code (leave blank to skip the live token exchange)")?;

	if let Some(code) = authorization_code {
		let authenticator = connector.exchange_code(session, code).await?;

		println!("Access token: {}", authenticator.access_token.expose());
		if let Some(refresh) = authenticator.refresh_token.as_ref() {
			println!("Refresh token: {}", refresh.expose());
		} else {
			println!("Provider did not return a refresh token.");
		}
		println!("Expires at: {}", authenticator.expires_at);

		let user = connector.fetch_user(&authenticator).await?;

		println!("Authenticated user: {}", user.text());

		let tweet_prompt = prompt_optional(
			"Tweet text (leave blank to skip posting to https://api.x.com/2/tweets)",
		)?;

		if let Some(text) = tweet_prompt {
			let response =
				connector.send(&PostTweet { text, authenticator: authenticator.clone() }).await?;

			println!("Tweet response ({}): {}", response.status(), response.text());
		} else {
			println!("Tweet skipped; token exchange confirmed.");
		}

		return Ok(());
	}

	println!("Authorization code not provided; skipping token exchange.");
	println!(
		"Persist the session details and call AuthorizationCodeGrant::exchange_code once a real authorization code is available."
	);

	Ok(())
}

fn prompt_with_default(message: &str, default: Option<&str>) -> Result<String> {
	loop {
		if let Some(value) = default {
			print!("{message} [{value}]: ");
		} else {
			print!("{message}: ");
		}

		io::stdout().flush()?;

		let mut input = String::new();

		io::stdin().read_line(&mut input)?;

		let trimmed = input.trim();

		if trimmed.is_empty() {
			if let Some(value) = default {
				return Ok(value.to_owned());
			}
		} else {
			return Ok(trimmed.to_owned());
		}
	}
}

fn prompt_optional(message: &str) -> Result<Option<String>> {
	print!("{message}: ");

	io::stdout().flush()?;

	let mut input = String::new();

	io::stdin().read_line(&mut input)?;

	let trimmed = input.trim();

	if trimmed.is_empty() { Ok(None) } else { Ok(Some(trimmed.to_owned())) }
}
