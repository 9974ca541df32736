//! Authorization handshake material: session-held CSRF state and PKCE (S256) pairs.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::OAuthError};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`AuthorizationSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Handshake material produced when starting an authorization.
///
/// The state (and PKCE verifier, when enabled) lives here rather than as connector
/// state, so concurrent authorizations against one connector never interfere. Persist
/// the session keyed by `state` until the redirect handler exchanges the code.
#[derive(Clone)]
pub struct AuthorizationSession {
	/// Opaque CSRF token that must round-trip via the redirect handler.
	pub state: String,
	/// Fully-formed authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	pkce: Option<PkcePair>,
}
impl AuthorizationSession {
	pub(super) fn new(state: String, authorize_url: Url, pkce: Option<PkcePair>) -> Self {
		Self { state, authorize_url, pkce }
	}

	/// PKCE code challenge appended to the authorize URL, when PKCE is enabled.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(PkcePair::challenge)
	}

	/// PKCE challenge method, when PKCE is enabled (currently always `S256`).
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(PkcePair::method)
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(OAuthError::StateMismatch.into())
		}
	}

	pub(super) fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("state", &self.state)
			.field("authorize_url", &self.authorize_url.as_str())
			.field("code_challenge", &self.code_challenge())
			.finish()
	}
}

#[derive(Clone)]
pub(super) struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	pub(super) fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}

	pub(super) fn challenge(&self) -> &str {
		&self.challenge
	}

	pub(super) fn method(&self) -> PkceCodeChallengeMethod {
		self.method
	}
}

pub(super) fn random_state() -> String {
	random_string(STATE_LEN)
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
