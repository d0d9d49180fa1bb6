//! Verification record queries.

// self
use crate::{
	_prelude::*,
	client::FaceClient,
	http::FaceHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	sign::{self, QUERY_RECORD_SIGN_KEYS},
	upstream::{self, SUCCESS_CODE},
};

/// Media attached to a queried record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RecordFiles {
	/// No media; `getFile` is omitted.
	#[default]
	None,
	/// Photo and video.
	All,
	/// Photo only.
	PhotoOnly,
	/// Video only.
	VideoOnly,
}
impl RecordFiles {
	/// Returns the `getFile` code sent on the wire, if any.
	pub const fn code(self) -> Option<&'static str> {
		match self {
			Self::None => None,
			Self::All => Some("1"),
			Self::PhotoOnly => Some("2"),
			Self::VideoOnly => Some("3"),
		}
	}
}

/// Parameters for [`FaceClient::query_verification_record`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordQuery {
	/// Order number of the session to look up.
	pub order_no: String,
	/// Media to include in the response.
	pub files: RecordFiles,
}
impl RecordQuery {
	/// Creates a query for `order_no` without media.
	pub fn new(order_no: impl Into<String>) -> Self {
		Self { order_no: order_no.into(), files: RecordFiles::None }
	}

	/// Requests media alongside the record.
	pub fn with_files(mut self, files: RecordFiles) -> Self {
		self.files = files;

		self
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordQueryFields<'a> {
	order_no: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	get_file: Option<&'static str>,
}

/// Full response of a record query, returned whatever its business code.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResult {
	/// Business code; [`SUCCESS_CODE`] when the record was found.
	#[serde(deserialize_with = "upstream::code")]
	pub code: String,
	/// Message accompanying the code.
	#[serde(default)]
	pub msg: String,
	/// Remote business sequence number.
	#[serde(default)]
	pub biz_seq_no: String,
	/// Remote transaction timestamp.
	#[serde(default)]
	pub transaction_time: String,
	/// Record details; absent for most failures.
	#[serde(default)]
	pub result: Option<RecordDetail>,
}
impl RecordResult {
	/// Returns `true` when the remote API reported success.
	pub fn is_success(&self) -> bool {
		self.code == SUCCESS_CODE
	}
}

/// Outcome of a finished verification session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetail {
	/// Order number of the session.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub order_no: String,
	/// Liveness score.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub live_rate: String,
	/// Similarity score against the reference photo.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub similarity: String,
	/// Completion timestamp.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub occurred_time: String,
	/// Application identifier the session belongs to.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub app_id: String,
	/// Base64-encoded photo, when requested.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub photo: String,
	/// Base64-encoded video, when requested.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub video: String,
	/// Remote business sequence number.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub biz_seq_no: String,
	/// SDK version used by the end user.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub sdk_version: String,
	/// Real-time video channel flag.
	#[serde(default, deserialize_with = "upstream::lenient_text")]
	pub trtc_flag: String,
}

impl<C> FaceClient<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Fetches the record of a verification session.
	///
	/// Signs `appId, orderNo, nonce, version, ticket` with the current API ticket and a fresh
	/// nonce. A non-success business code is returned inside [`RecordResult`] instead of failing;
	/// check [`RecordResult::is_success`].
	pub async fn query_verification_record(&self, query: &RecordQuery) -> Result<RecordResult> {
		const KIND: Operation = Operation::QueryRecord;

		let span = OperationSpan::new(KIND, "query_verification_record");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ticket = self.tickets.get_api_ticket().await?;
				let config = self.config();
				let mut fields = upstream::signable(
					KIND,
					&RecordQueryFields { order_no: &query.order_no, get_file: query.files.code() },
				)?;

				fields
					.insert("appId", config.app_id.as_str())
					.insert("version", config.version.as_str())
					.insert("nonce", sign::nonce())
					.insert("ticket", ticket.expose());
				fields.sign_into(&QUERY_RECORD_SIGN_KEYS)?;

				self.upstream
					.post_order_json(KIND, &config.endpoints.query_record, &query.order_no, &fields)
					.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		client::tests::{TOKEN, build_client, ticket_body},
		http::scripted::ScriptedTransport,
		sign::{NONCE_LEN, SignableRequest},
	};

	#[tokio::test]
	async fn signs_and_decodes_records() {
		let (client, transport) = build_client(
			ScriptedTransport::default()
				.respond("access_token", TOKEN)
				.respond("api_ticket", &ticket_body("tk1"))
				.respond(
					"queryfacerecord",
					r#"{"code":"0","msg":"success","bizSeqNo":"B1","result":{"orderNo":"O1","liveRate":"99","similarity":87.5,"occurredTime":"20300101000500","appId":"A1","photo":"cGhvdG8=","video":null,"sdkVersion":"1.0","trtcFlag":"Y"}}"#,
				),
		);
		let query = RecordQuery::new("O1").with_files(RecordFiles::PhotoOnly);
		let record = client.query_verification_record(&query).await.expect("Query succeeds.");

		assert!(record.is_success());
		assert_eq!(record.biz_seq_no, "B1");

		let detail = record.result.expect("Record carries details.");

		assert_eq!(detail.order_no, "O1");
		assert_eq!(detail.live_rate, "99");
		assert_eq!(detail.similarity, "87.5");
		assert_eq!(detail.photo, "cGhvdG8=");
		assert_eq!(detail.video, "");
		assert_eq!(detail.trtc_flag, "Y");

		let post = transport
			.calls()
			.into_iter()
			.find(|call| call.method == "POST")
			.expect("Query was posted.");
		let body = SignableRequest::from_serialize(post.body.as_ref().expect("Body is present."))
			.expect("Body is an object.");

		assert_eq!(post.query_value("orderNo"), Some("O1"));
		assert_eq!(body.get_str("appId").as_deref(), Some("A1"));
		assert_eq!(body.get_str("getFile").as_deref(), Some("2"));
		assert_eq!(body.get_str("nonce").map(|nonce| nonce.len()), Some(NONCE_LEN));
		assert_eq!(
			body.get_str("sign"),
			Some(sign::sign(&QUERY_RECORD_SIGN_KEYS, &body).expect("Every key is present."))
		);
	}

	#[tokio::test]
	async fn business_failures_are_returned_not_raised() {
		let (client, _) = build_client(
			ScriptedTransport::default()
				.respond("access_token", TOKEN)
				.respond("api_ticket", &ticket_body("tk1"))
				.respond("queryfacerecord", r#"{"code":"66660011","msg":"record not found"}"#),
		);
		let record = client
			.query_verification_record(&RecordQuery::new("O404"))
			.await
			.expect("Non-zero codes are data, not errors.");

		assert!(!record.is_success());
		assert_eq!(record.code, "66660011");
		assert_eq!(record.msg, "record not found");
		assert!(record.result.is_none());
	}

	#[test]
	fn record_files_codes() {
		assert_eq!(RecordFiles::default().code(), None);
		assert_eq!(RecordFiles::All.code(), Some("1"));
		assert_eq!(RecordFiles::PhotoOnly.code(), Some("2"));
		assert_eq!(RecordFiles::VideoOnly.code(), Some("3"));
	}
}
