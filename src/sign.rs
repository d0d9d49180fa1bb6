//! Canonical request signing and nonce generation.
//!
//! The remote API authenticates calls with a SHA-1 digest over a fixed subset of request
//! fields. Field values (not names) are sorted lexicographically and concatenated without a
//! separator before hashing, so the signature only depends on the multiset of signed values.

// crates.io
use rand::{Rng, distr::Alphanumeric};
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
// self
use crate::_prelude::*;

/// Number of characters in a generated nonce.
pub const NONCE_LEN: usize = 32;

/// Keys signed by the verification-initiation call, in canonical order.
pub const INITIATE_SIGN_KEYS: [&str; 7] =
	["webankAppId", "orderNo", "name", "idNo", "userId", "version", "ticket"];
/// Keys signed by the hosted login URL, in canonical order.
pub const HOSTED_URL_SIGN_KEYS: [&str; 7] =
	["webankAppId", "orderNo", "h5faceId", "userId", "nonce", "ticket", "version"];
/// Keys signed by the record query call, in canonical order.
pub const QUERY_RECORD_SIGN_KEYS: [&str; 5] = ["appId", "orderNo", "nonce", "version", "ticket"];

/// Ordered mapping from field name to scalar value, assembled right before signing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignableRequest(BTreeMap<String, Value>);
impl SignableRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a request from any value serializing to a JSON object.
	///
	/// `null` fields are dropped so optional inputs never reach the wire or the signature.
	pub fn from_serialize<T>(value: &T) -> Result<Self, serde_json::Error>
	where
		T: ?Sized + Serialize,
	{
		match serde_json::to_value(value)? {
			Value::Object(map) => Ok(Self::from(map)),
			other => Err(serde::ser::Error::custom(format!(
				"Signable requests must serialize to a JSON object, got `{other}`."
			))),
		}
	}

	/// Sets a field, replacing any previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Returns the raw value of a field.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the stringified value of a field.
	pub fn get_str(&self, key: &str) -> Option<String> {
		self.0.get(key).map(scalar_text)
	}

	/// Iterates over `(name, stringified value)` pairs in name order.
	pub fn iter_text(&self) -> impl Iterator<Item = (&str, String)> {
		self.0.iter().map(|(key, value)| (key.as_str(), scalar_text(value)))
	}

	/// Returns `true` when no fields are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Signs the request over `keys` and stores the result under `sign`.
	pub fn sign_into<K>(&mut self, keys: &[K]) -> Result<String>
	where
		K: AsRef<str>,
	{
		let signature = sign(keys, self)?;

		self.insert("sign", signature.clone());

		Ok(signature)
	}
}
impl From<Map<String, Value>> for SignableRequest {
	fn from(map: Map<String, Value>) -> Self {
		Self(map.into_iter().filter(|(_, value)| !value.is_null()).collect())
	}
}
impl<K, V> FromIterator<(K, V)> for SignableRequest
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// Computes the canonical signature of `fields` over `keys`.
///
/// Every key must be present; the first absent one yields [`Error::MissingField`]. The
/// stringified values are sorted by value, concatenated, hashed with SHA-1, and rendered as
/// lowercase hex.
pub fn sign<K>(keys: &[K], fields: &SignableRequest) -> Result<String>
where
	K: AsRef<str>,
{
	let mut values = Vec::with_capacity(keys.len());

	for key in keys {
		let key = key.as_ref();
		let value =
			fields.get_str(key).ok_or_else(|| Error::MissingField { field: key.to_owned() })?;

		values.push(value);
	}

	values.sort_unstable();

	let mut hasher = Sha1::new();

	for value in &values {
		hasher.update(value.as_bytes());
	}

	Ok(format!("{:x}", hasher.finalize()))
}

/// Generates a random alphanumeric nonce of [`NONCE_LEN`] characters.
pub fn nonce() -> String {
	rand::rng().sample_iter(&Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}
