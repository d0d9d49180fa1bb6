//! Demonstrates a full hosted verification round trip against a mock server: initiate a
//! session, build the signed hosted page URL, then query the session record.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use faceid_sdk::{
	client::{FaceClient, HostedUrlRequest, RecordFiles, RecordQuery, VerificationRequest},
	config::FaceConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/oauth2/access_token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"code":"0","msg":"success","access_token":"demo-token","expire_time":"20991231235959","expire_in":7200}"#,
			);
		})
		.await;
	let ticket_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/oauth2/api_ticket");
			then.status(200).header("content-type", "application/json").body(
				r#"{"code":"0","msg":"success","tickets":[{"value":"demo-ticket","expire_time":"20991231235959","expire_in":3600}]}"#,
			);
		})
		.await;
	let initiate_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/server/h5/geth5faceid").query_param("orderNo", "demo-order");
			then.status(200).header("content-type", "application/json").body(
				r#"{"code":"0","msg":"success","result":{"bizSeqNo":"demo-seq","orderNo":"demo-order","h5faceId":"demo-face","optimalDomain":"","success":true}}"#,
			);
		})
		.await;
	let record_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/base/queryfacerecord");
			then.status(200).header("content-type", "application/json").body(
				r#"{"code":"0","msg":"success","result":{"orderNo":"demo-order","liveRate":"99","similarity":"92.5"}}"#,
			);
		})
		.await;
	let config = FaceConfig::builder("demo-app", "demo-secret")
		.base_url(Url::parse(&server.base_url())?)
		.request_timeout(Duration::from_secs(5))
		.build()?;
	let client = FaceClient::new(config)?;
	let handle = client
		.initiate_verification(&VerificationRequest::new(
			"demo-order",
			"Alice",
			"110101199001011234",
			"demo-user",
		))
		.await?;
	let mut hosted = HostedUrlRequest::new(
		&handle.order_no,
		&handle.face_id,
		"demo-user",
		"https://app.example.com/verified",
	);

	if let Some(domain) = handle.optimal_domain_url()? {
		hosted = hosted.with_domain(domain);
	}

	let url = client.build_hosted_url(&hosted).await?;

	println!("Hosted verification page: {url}.");

	let record = client
		.query_verification_record(&RecordQuery::new("demo-order").with_files(RecordFiles::None))
		.await?;

	println!(
		"Record for {}: success={}, similarity={}.",
		handle.order_no,
		record.is_success(),
		record.result.map(|detail| detail.similarity).unwrap_or_default()
	);

	token_mock.assert_async().await;
	ticket_mock.assert_calls_async(2).await;
	initiate_mock.assert_async().await;
	record_mock.assert_async().await;

	Ok(())
}
