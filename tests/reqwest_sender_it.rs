#![cfg(feature = "reqwest")]

mod common;

// crates.io
use http::StatusCode;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// courier
use courier::{
	connector::Connector,
	pipeline::{PipelineHandle, builtin::ErrorForStatus},
	request::Body,
	sender::{ReqwestSender, Sender},
};
// tests
use common::*;

struct LiveConnector {
	base_url: Url,
	sender: ReqwestSender,
	pipeline: PipelineHandle,
}
impl LiveConnector {
	fn new(base_url: &str) -> Self {
		// `httpmock` serves its HTTPS endpoint with a self-signed certificate.
		let client = courier::reqwest::Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Insecure test client should build.");

		Self {
			base_url: Url::parse(base_url).expect("Server URL should parse."),
			sender: ReqwestSender::with_client(client),
			pipeline: PipelineHandle::default(),
		}
	}
}
impl Connector for LiveConnector {
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

#[tokio::test]
async fn get_round_trips_json_over_the_wire() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/users/42").query_param("fields", "login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":42,\"login\":\"octocat\"}");
		})
		.await;
	let connector = LiveConnector::new(&server.base_url());
	let response = connector
		.send(&TestRequest::get("users/42").with_query("fields", "login"))
		.await
		.expect("Dispatch should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.header("content-type"), Some("application/json"));
	assert_eq!(
		response.json::<serde_json::Value>().expect("Body should decode."),
		json!({ "id": 42, "login": "octocat" })
	);
}

#[tokio::test]
async fn form_bodies_are_url_encoded_with_the_matching_content_type() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body("grant_type=authorization_code&scope=openid+profile");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"a\",\"expires_in\":3600}");
		})
		.await;
	let connector = LiveConnector::new(&server.base_url());
	let request = TestRequest::post("token").with_body(Body::Form(vec![
		("grant_type".into(), "authorization_code".into()),
		("scope".into(), "openid profile".into()),
	]));
	let response = connector.send(&request).await.expect("Dispatch should succeed.");

	mock.assert_async().await;

	assert!(response.is_success());
}

#[tokio::test]
async fn error_statuses_come_back_as_responses_until_converted() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/missing");
			then.status(404).body("nothing here");
		})
		.await;

	let connector = LiveConnector::new(&server.base_url());
	let response = connector
		.send(&TestRequest::get("missing"))
		.await
		.expect("Transport should succeed despite the error status.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(response.text(), "nothing here");

	// With the conversion stage registered, the same status surfaces as an error.
	connector.pipeline().push(ErrorForStatus);

	let err = connector
		.send(&TestRequest::get("missing"))
		.await
		.expect_err("Conversion stage should raise on the error status.");

	assert!(matches!(err, courier::error::Error::Status(_)));
}

#[tokio::test]
async fn request_headers_reach_the_server() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").header("authorization", "Bearer wire-token");
			then.status(200);
		})
		.await;
	let connector = LiveConnector::new(&server.base_url());

	connector
		.send(
			&TestRequest::get("me")
				.with_authenticator(courier::auth::TokenAuthenticator::new("wire-token")),
		)
		.await
		.expect("Dispatch should succeed.");

	mock.assert_async().await;
}
