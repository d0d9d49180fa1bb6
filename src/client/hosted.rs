//! Hosted verification page URLs.

// self
use crate::{
	_prelude::*,
	client::FaceClient,
	config::FaceEndpoints,
	http::FaceHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	sign::{self, HOSTED_URL_SIGN_KEYS},
	upstream,
};

/// Environment the hosted page is opened from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostedFrom {
	/// Mobile or desktop browser.
	#[serde(rename = "browser")]
	Browser,
	/// Embedded web view inside a native app.
	#[serde(rename = "App")]
	App,
}

/// Parameters for [`FaceClient::build_hosted_url`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedUrlRequest {
	/// Order number of the session.
	pub order_no: String,
	/// Face verification session identifier returned by the initiation call.
	#[serde(rename = "h5faceId")]
	pub face_id: String,
	/// Caller-side user identifier; selects the nonce ticket.
	pub user_id: String,
	/// Callback the hosted page redirects to when the session ends.
	pub url: String,
	/// Result delivery mode code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result_type: Option<String>,
	/// Environment the page is opened from.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from: Option<HostedFrom>,
	/// Redirect behavior code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub redirect_type: Option<String>,
	/// Host serving the page; defaults to the configured optimal domain.
	#[serde(skip)]
	pub domain: Option<Url>,
}
impl HostedUrlRequest {
	/// Creates a request for the required session fields.
	pub fn new(
		order_no: impl Into<String>,
		face_id: impl Into<String>,
		user_id: impl Into<String>,
		callback_url: impl Into<String>,
	) -> Self {
		Self {
			order_no: order_no.into(),
			face_id: face_id.into(),
			user_id: user_id.into(),
			url: callback_url.into(),
			result_type: None,
			from: None,
			redirect_type: None,
			domain: None,
		}
	}

	/// Sets the result delivery mode.
	pub fn with_result_type(mut self, result_type: impl Into<String>) -> Self {
		self.result_type = Some(result_type.into());

		self
	}

	/// Sets the environment the page is opened from.
	pub fn with_from(mut self, from: HostedFrom) -> Self {
		self.from = Some(from);

		self
	}

	/// Sets the redirect behavior.
	pub fn with_redirect_type(mut self, redirect_type: impl Into<String>) -> Self {
		self.redirect_type = Some(redirect_type.into());

		self
	}

	/// Serves the page from `domain` instead of the configured optimal domain.
	pub fn with_domain(mut self, domain: Url) -> Self {
		self.domain = Some(domain);

		self
	}
}

impl<C> FaceClient<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Builds the signed hosted verification URL for a session.
	///
	/// Fetches the nonce ticket for the request's user, then signs
	/// `webankAppId, orderNo, h5faceId, userId, nonce, ticket, version` with a fresh nonce.
	/// Every field plus `sign` lands in the query string; no other call is made.
	pub async fn build_hosted_url(&self, request: &HostedUrlRequest) -> Result<Url> {
		const KIND: Operation = Operation::HostedUrl;

		let span = OperationSpan::new(KIND, "build_hosted_url");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ticket = self.tickets.get_nonce_ticket(&request.user_id).await?;
				let config = self.config();
				let mut fields = upstream::signable(KIND, request)?;

				fields
					.insert("webankAppId", config.app_id.as_str())
					.insert("version", config.version.as_str())
					.insert("nonce", sign::nonce())
					.insert("ticket", ticket.expose());
				fields.sign_into(&HOSTED_URL_SIGN_KEYS)?;

				let mut url = match &request.domain {
					Some(domain) => FaceEndpoints::hosted_login_on(domain)?,
					None => config.endpoints.hosted_login.clone(),
				};

				url.query_pairs_mut().extend_pairs(fields.iter_text());

				Ok(url)
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}
}
