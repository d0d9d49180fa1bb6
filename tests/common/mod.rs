//! Shared fixtures for integration tests backed by an `httpmock` server.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::{Mock, prelude::*};
use time::{OffsetDateTime, UtcOffset};
use url::Url;
// self
use faceid_sdk::{
	auth::RefreshPolicy,
	client::{FaceClient, ReqwestFaceClient},
	clock::ManualClock,
	config::FaceConfig,
	http::ReqwestHttpClient,
};

pub const APP_ID: &str = "A1";
pub const SECRET: &str = "S1";
pub const TOKEN_PATH: &str = "/api/oauth2/access_token";
pub const TICKET_PATH: &str = "/api/oauth2/api_ticket";
pub const INITIATE_PATH: &str = "/api/server/h5/geth5faceid";
pub const QUERY_RECORD_PATH: &str = "/api/v2/base/queryfacerecord";

/// Builds a config pointing every endpoint at `server`, with expiries read as UTC.
pub fn config(server: &MockServer, policy: RefreshPolicy) -> FaceConfig {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");

	FaceConfig::builder(APP_ID, SECRET)
		.base_url(base)
		.expiry_offset(UtcOffset::UTC)
		.refresh_policy(policy)
		.build()
		.expect("Test config should build.")
}

/// Builds a reqwest-backed client driven by a manual clock starting at `now`.
pub fn build_client(
	server: &MockServer,
	policy: RefreshPolicy,
	now: OffsetDateTime,
) -> (ReqwestFaceClient, ManualClock) {
	let clock = ManualClock::new(now);
	let client = FaceClient::with_parts(
		config(server, policy),
		Arc::new(ReqwestHttpClient::default()),
		Arc::new(clock.clone()),
	);

	(client, clock)
}

/// Mocks the token endpoint with a successful exchange.
pub async fn mock_token<'a>(server: &'a MockServer, token: &str, expire_time: &str) -> Mock<'a> {
	let body = format!(
		r#"{{"code":"0","msg":"success","transactionTime":"20300101000000","access_token":"{token}","expire_time":"{expire_time}","expire_in":7200}}"#
	);

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TOKEN_PATH)
				.query_param("app_id", APP_ID)
				.query_param("secret", SECRET)
				.query_param("version", "1.0.0")
				.query_param("grant_type", "client_credential");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

/// Mocks the ticket endpoint for API tickets with a single ticket.
pub async fn mock_api_ticket<'a>(
	server: &'a MockServer,
	ticket: &str,
	expire_time: &str,
) -> Mock<'a> {
	let body = ticket_body(ticket, expire_time);

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TICKET_PATH)
				.query_param("app_id", APP_ID)
				.query_param("type", "SIGN")
				.query_param_missing("user_id");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

/// Mocks the ticket endpoint for nonce tickets issued to `user_id`.
pub async fn mock_nonce_ticket<'a>(
	server: &'a MockServer,
	user_id: &str,
	ticket: &str,
	expire_time: &str,
) -> Mock<'a> {
	let body = ticket_body(ticket, expire_time);

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TICKET_PATH)
				.query_param("app_id", APP_ID)
				.query_param("type", "SIGN")
				.query_param("user_id", user_id);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

pub fn ticket_body(ticket: &str, expire_time: &str) -> String {
	format!(
		r#"{{"code":"0","msg":"success","transactionTime":"20300101000000","tickets":[{{"value":"{ticket}","expire_time":"{expire_time}","expire_in":3600}}]}}"#
	)
}
