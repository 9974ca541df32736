//! Walks through launching an authorization-code + PKCE session and persisting it for
//! the redirect handler to later exchange.

// std
use std::collections::HashMap;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use courier::{
	connector::Connector,
	oauth2::{AuthorizationCodeGrant, OAuthConfig},
	pipeline::PipelineHandle,
	sender::{ReqwestSender, Sender},
};

struct GithubConnector {
	base_url: Url,
	sender: ReqwestSender,
	pipeline: PipelineHandle,
	oauth: OAuthConfig,
}
impl Connector for GithubConnector {
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
impl AuthorizationCodeGrant for GithubConnector {
	fn oauth_config(&self) -> &OAuthConfig {
		&self.oauth
	}
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let connector = GithubConnector {
		base_url: Url::parse("https://github.com")?,
		sender: ReqwestSender::default(),
		pipeline: PipelineHandle::default(),
		oauth: OAuthConfig::new(
			"demo-client",
			"demo-secret",
			"https://app.example.com/oauth/callback",
		)
		.with_authorize_endpoint("login/oauth/authorize")
		.with_token_endpoint("login/oauth/access_token")
		.with_user_endpoint("https://api.github.com/user")
		.with_default_scopes(["read:user"])
		.with_pkce(true),
	};
	let session = connector.start_authorization(&["user:email"])?;

	println!("Send your user to {}.", &session.authorize_url);
	println!(
		"PKCE challenge ({:?}): {:?}.",
		session.code_challenge_method(),
		session.code_challenge()
	);

	let mut sessions: HashMap<String, _> = HashMap::new();

	sessions.insert(session.state.clone(), session.clone());

	// Simulate the redirect handler looking up the stored session by `state`.
	let returned_state = session.state.clone();

	if let Some(stashed) = sessions.remove(&returned_state) {
		stashed.validate_state(&returned_state)?;
		println!("State validated; the session is ready for the code exchange.");
		println!(
			"Persist this session and call AuthorizationCodeGrant::exchange_code during the callback."
		);
	} else {
		eprintln!("State `{returned_state}` was not recognized.");
	}

	Ok(())
}
