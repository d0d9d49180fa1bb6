//! Shared client state plus the JSON call helpers every cache and operation goes through.

// crates.io
use serde::{Deserializer, de::DeserializeOwned};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	clock::Clock,
	config::FaceConfig,
	error::DecodeError,
	http::{FaceHttpClient, HttpResponse, JSON_CONTENT_TYPE},
	obs::Operation,
	sign::SignableRequest,
};

/// Business code signalling success in every response envelope.
pub const SUCCESS_CODE: &str = "0";

/// Configuration, transport, and time source shared by the caches and the client.
pub struct Upstream<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Immutable client configuration.
	pub config: FaceConfig,
	/// Transport used for every outbound call.
	pub http_client: Arc<C>,
	/// Time source used for freshness checks.
	pub clock: Arc<dyn Clock>,
}
impl<C> Upstream<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Bundles the shared state.
	pub fn new(config: FaceConfig, http_client: Arc<C>, clock: Arc<dyn Clock>) -> Self {
		Self { config, http_client, clock }
	}

	/// Returns the current instant according to the configured clock.
	pub fn now(&self) -> OffsetDateTime {
		self.clock.now()
	}

	/// Issues a GET and decodes the JSON response.
	pub(crate) async fn get_json<T>(
		&self,
		operation: Operation,
		url: &Url,
		query: &[(String, String)],
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.http_client.get(url, query, &[]).await?;

		decode(operation, &response)
	}

	/// Issues a POST carrying `body` with `orderNo` duplicated in the query string, then
	/// decodes the JSON response.
	pub(crate) async fn post_order_json<T>(
		&self,
		operation: Operation,
		url: &Url,
		order_no: &str,
		body: &SignableRequest,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut target = url.clone();

		target.query_pairs_mut().append_pair("orderNo", order_no);

		let body = serde_json::to_value(body)
			.map_err(|source| DecodeError::Serialize { operation: operation.as_str(), source })?;
		let response = self.http_client.post(&target, &body, &[JSON_CONTENT_TYPE]).await?;

		decode(operation, &response)
	}
}
impl<C> Debug for Upstream<C>
where
	C: ?Sized + FaceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Upstream").field("config", &self.config).finish()
	}
}

/// Serializes `value` into a field map, dropping `null` fields.
pub(crate) fn signable<T>(operation: Operation, value: &T) -> Result<SignableRequest>
where
	T: ?Sized + Serialize,
{
	SignableRequest::from_serialize(value)
		.map_err(|source| DecodeError::Serialize { operation: operation.as_str(), source }.into())
}

/// Serializes `value` into query pairs, dropping `null` fields.
pub(crate) fn query_pairs<T>(operation: Operation, value: &T) -> Result<Vec<(String, String)>>
where
	T: ?Sized + Serialize,
{
	let fields = signable(operation, value)?;

	Ok(fields.iter_text().map(|(key, value)| (key.to_owned(), value)).collect())
}

/// Decodes a JSON response body, tracking the path of any schema mismatch.
pub(crate) fn decode<T>(operation: Operation, response: &HttpResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		DecodeError::Json { operation: operation.as_str(), source, status: response.status }.into()
	})
}

/// Fails with [`Error::RemoteApi`] unless `code` is [`SUCCESS_CODE`].
pub(crate) fn ensure_success(operation: Operation, code: &str, message: &str) -> Result<()> {
	if code == SUCCESS_CODE {
		Ok(())
	} else {
		Err(Error::RemoteApi {
			operation: operation.as_str(),
			code: code.to_owned(),
			message: message.to_owned(),
		})
	}
}

/// Unwraps a field a successful response must carry, failing with
/// [`DecodeError::MissingResponseField`] when it is absent.
pub(crate) fn required<T>(
	operation: Operation,
	field: &'static str,
	value: Option<T>,
) -> Result<T> {
	value.ok_or_else(|| {
		DecodeError::MissingResponseField { operation: operation.as_str(), field }.into()
	})
}

/// Accepts business codes rendered either as JSON strings or numbers.
pub(crate) fn code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawCode {
		Text(String),
		Number(i64),
	}

	Ok(match RawCode::deserialize(deserializer)? {
		RawCode::Text(text) => text,
		RawCode::Number(number) => number.to_string(),
	})
}

/// Reads a JSON value that may be a string or a number as text.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::String(text) => text,
		Value::Null => String::new(),
		other => other.to_string(),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Envelope {
		#[serde(deserialize_with = "code")]
		code: String,
		#[serde(default, deserialize_with = "lenient_text")]
		rate: String,
	}

	#[test]
	fn codes_accept_strings_and_numbers() {
		let text: Envelope = decode(
			Operation::AccessToken,
			&HttpResponse::new(200, r#"{"code":"66660004","rate":"99.5"}"#),
		)
		.expect("String code decodes.");
		let number: Envelope = decode(
			Operation::AccessToken,
			&HttpResponse::new(200, r#"{"code":0,"rate":87}"#),
		)
		.expect("Numeric code decodes.");

		assert_eq!(text.code, "66660004");
		assert_eq!(text.rate, "99.5");
		assert_eq!(number.code, "0");
		assert_eq!(number.rate, "87");
	}

	#[test]
	fn decode_errors_carry_path_and_status() {
		let err = decode::<Envelope>(
			Operation::ApiTicket,
			&HttpResponse::new(502, r#"{"code":["nested"]}"#),
		)
		.expect_err("Arrays are not codes.");

		match err {
			Error::Decode(DecodeError::Json { operation, source, status }) => {
				assert_eq!(operation, "api_ticket");
				assert_eq!(status, 502);
				assert_eq!(source.path().to_string(), "code");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		let err = decode::<Envelope>(Operation::ApiTicket, &HttpResponse::new(200, "<html>"))
			.expect_err("HTML bodies are not JSON.");

		assert!(matches!(err, Error::Decode(DecodeError::Json { .. })));
	}

	#[test]
	fn non_success_codes_become_remote_errors() {
		assert!(ensure_success(Operation::QueryRecord, "0", "ok").is_ok());

		let err = ensure_success(Operation::QueryRecord, "400101", "ticket expired")
			.expect_err("Non-zero codes are rejected.");

		assert!(matches!(
			err,
			Error::RemoteApi { operation: "query_record", ref code, ref message }
				if code == "400101" && message == "ticket expired"
		));
	}

	#[test]
	fn query_pairs_skip_absent_fields() {
		#[derive(Serialize)]
		struct Query {
			app_id: &'static str,
			user_id: Option<&'static str>,
		}

		let pairs = query_pairs(Operation::NonceTicket, &Query { app_id: "A1", user_id: None })
			.expect("Struct serializes to an object.");

		assert_eq!(pairs, vec![("app_id".to_owned(), "A1".to_owned())]);
	}
}
