//! Verification-session initiation.

// self
use crate::{
	_prelude::*,
	client::FaceClient,
	error::ConfigError,
	http::FaceHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	sign::INITIATE_SIGN_KEYS,
	upstream,
};

/// Kind of reference photo supplied with a verification request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourcePhotoType {
	/// Watermarked portrait, as returned by identity registries.
	#[serde(rename = "1")]
	Watermarked,
	/// High-definition portrait captured by the caller.
	#[serde(rename = "2")]
	HighDefinition,
}

/// Parameters for [`FaceClient::initiate_verification`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
	/// Caller-generated order number identifying the session.
	pub order_no: String,
	/// Full legal name of the person being verified.
	pub name: String,
	/// Identity document number.
	pub id_no: String,
	/// Caller-side user identifier.
	pub user_id: String,
	/// Base64-encoded reference photo.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_photo_str: Option<String>,
	/// Kind of the reference photo.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_photo_type: Option<SourcePhotoType>,
	/// Liveness interaction mode code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub live_inter_type: Option<String>,
}
impl VerificationRequest {
	/// Creates a request for the required identity fields.
	pub fn new(
		order_no: impl Into<String>,
		name: impl Into<String>,
		id_no: impl Into<String>,
		user_id: impl Into<String>,
	) -> Self {
		Self {
			order_no: order_no.into(),
			name: name.into(),
			id_no: id_no.into(),
			user_id: user_id.into(),
			source_photo_str: None,
			source_photo_type: None,
			live_inter_type: None,
		}
	}

	/// Attaches a reference photo to compare against.
	pub fn with_source_photo(mut self, photo: impl Into<String>, kind: SourcePhotoType) -> Self {
		self.source_photo_str = Some(photo.into());
		self.source_photo_type = Some(kind);

		self
	}

	/// Selects the liveness interaction mode.
	pub fn with_live_inter_type(mut self, mode: impl Into<String>) -> Self {
		self.live_inter_type = Some(mode.into());

		self
	}
}

/// Session handle returned by a successful initiation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationHandle {
	/// Order number echoed by the remote API.
	#[serde(default)]
	pub order_no: String,
	/// Face verification session identifier (`h5faceId`).
	#[serde(rename = "h5faceId")]
	pub face_id: String,
	/// Host that should serve the hosted verification page for this session.
	#[serde(default)]
	pub optimal_domain: String,
	/// Whether the remote API reported the session as created.
	#[serde(default)]
	pub success: bool,
	/// Remote business sequence number.
	#[serde(default)]
	pub biz_seq_no: String,
	/// Remote transaction timestamp.
	#[serde(default)]
	pub transaction_time: String,
}
impl VerificationHandle {
	/// Parses [`Self::optimal_domain`] as a URL, assuming `https` for bare host names.
	///
	/// Returns `None` when the remote API did not report a domain.
	pub fn optimal_domain_url(&self) -> Result<Option<Url>, ConfigError> {
		let domain = self.optimal_domain.trim();

		if domain.is_empty() {
			return Ok(None);
		}

		let raw =
			if domain.contains("://") { domain.to_owned() } else { format!("https://{domain}") };

		Url::parse(&raw)
			.map(Some)
			.map_err(|source| ConfigError::InvalidUrl { name: "optimal domain", source })
	}
}

#[derive(Debug, Deserialize)]
struct InitiateResponse {
	#[serde(deserialize_with = "upstream::code")]
	code: String,
	#[serde(default)]
	msg: String,
	#[serde(default)]
	result: Option<VerificationHandle>,
}

impl<C> FaceClient<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Starts a verification session and returns its handle.
	///
	/// Signs `webankAppId, orderNo, name, idNo, userId, version, ticket` with the current API
	/// ticket. A non-success business code fails with [`Error::RemoteApi`].
	pub async fn initiate_verification(
		&self,
		request: &VerificationRequest,
	) -> Result<VerificationHandle> {
		const KIND: Operation = Operation::InitiateVerification;

		let span = OperationSpan::new(KIND, "initiate_verification");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ticket = self.tickets.get_api_ticket().await?;
				let config = self.config();
				let mut fields = upstream::signable(KIND, request)?;

				fields
					.insert("webankAppId", config.app_id.as_str())
					.insert("version", config.version.as_str())
					.insert("ticket", ticket.expose());
				fields.sign_into(&INITIATE_SIGN_KEYS)?;

				let response: InitiateResponse = self
					.upstream
					.post_order_json(
						KIND,
						&config.endpoints.initiate_verification,
						&request.order_no,
						&fields,
					)
					.await?;

				upstream::ensure_success(KIND, &response.code, &response.msg)?;

				upstream::required(KIND, "result", response.result)
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}
}
