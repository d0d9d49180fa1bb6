//! Transport primitives for calls against the verification API.
//!
//! The SDK depends on an HTTP stack only through [`FaceHttpClient`], which exposes the two
//! primitives the remote API needs: a GET with query parameters and a POST with a JSON body.
//! [`ReqwestHttpClient`] is the default implementation. Custom transports (test doubles,
//! instrumented clients, alternative stacks) implement the trait and are handed to
//! [`FaceClient::with_http_client`](crate::client::FaceClient::with_http_client).
//!
//! Dropping a returned future cancels the in-flight request.

// std
#[cfg(feature = "reqwest")] use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`FaceHttpClient`] calls.
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Header name/value pairs attached to a request.
pub type Headers<'a> = &'a [(&'a str, &'a str)];

/// `Content-Type` header sent with JSON bodies.
pub const JSON_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// Abstraction over HTTP transports able to reach the verification API.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// clone of a client, and the futures they return must be `Send` so operations can hop
/// executors.
pub trait FaceHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Issues a GET against `url` with `query` appended as URL parameters.
	fn get<'a>(
		&'a self,
		url: &'a Url,
		query: &'a [(String, String)],
		headers: Headers<'a>,
	) -> HttpFuture<'a>;

	/// Issues a POST against `url` carrying `body` serialized as JSON.
	fn post<'a>(&'a self, url: &'a Url, body: &'a Value, headers: Headers<'a>) -> HttpFuture<'a>;
}

/// Raw response returned by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
	timeout: Option<StdDuration>,
}
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, timeout: None }
	}

	/// Bounds every request issued through this transport.
	pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}

	async fn execute(
		&self,
		request: reqwest::RequestBuilder,
		headers: Headers<'_>,
	) -> Result<HttpResponse, TransportError> {
		let mut request = request;

		for (name, value) in headers {
			request = request.header(*name, *value);
		}
		if let Some(timeout) = self.timeout {
			request = request.timeout(timeout);
		}

		let response = request.send().await?;
		let status = response.status().as_u16();
		let body = response.bytes().await?.to_vec();

		Ok(HttpResponse { status, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl FaceHttpClient for ReqwestHttpClient {
	fn get<'a>(
		&'a self,
		url: &'a Url,
		query: &'a [(String, String)],
		headers: Headers<'a>,
	) -> HttpFuture<'a> {
		Box::pin(async move {
			let mut target = url.clone();

			if !query.is_empty() {
				target.query_pairs_mut().extend_pairs(query.iter());
			}

			self.execute(self.client.get(target), headers).await
		})
	}

	fn post<'a>(&'a self, url: &'a Url, body: &'a Value, headers: Headers<'a>) -> HttpFuture<'a> {
		Box::pin(async move {
			let payload = serde_json::to_vec(body)
				.map_err(|e| TransportError::Io(std::io::Error::other(e)))?;

			self.execute(self.client.post(url.clone()).body(payload), headers).await
		})
	}
}

/// Scripted in-memory transport shared by unit tests.
#[cfg(test)]
pub(crate) mod scripted {
	// std
	use std::collections::{HashMap, VecDeque};
	// crates.io
	use serde_json::Value;
	// self
	use super::*;

	/// One call observed by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub(crate) struct RecordedCall {
		pub(crate) method: &'static str,
		pub(crate) url: Url,
		pub(crate) query: Vec<(String, String)>,
		pub(crate) body: Option<Value>,
		pub(crate) headers: Vec<(String, String)>,
	}
	impl RecordedCall {
		pub(crate) fn endpoint(&self) -> &str {
			last_segment(&self.url)
		}

		pub(crate) fn query_value(&self, key: &str) -> Option<&str> {
			self.query.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
		}
	}

	/// Replays queued bodies per endpoint (last path segment) and records every call.
	#[derive(Debug, Default)]
	pub(crate) struct ScriptedTransport {
		routes: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
		calls: Mutex<Vec<RecordedCall>>,
	}
	impl ScriptedTransport {
		pub(crate) fn respond(self, endpoint: &str, body: &str) -> Self {
			self.routes
				.lock()
				.entry(endpoint.to_owned())
				.or_default()
				.push_back(HttpResponse::new(200, body));

			self
		}

		pub(crate) fn calls(&self) -> Vec<RecordedCall> {
			self.calls.lock().clone()
		}

		pub(crate) fn count(&self, endpoint: &str) -> usize {
			self.calls.lock().iter().filter(|call| call.endpoint() == endpoint).count()
		}

		fn reply(
			&self,
			method: &'static str,
			url: &Url,
			query: &[(String, String)],
			body: Option<&Value>,
			headers: Headers<'_>,
		) -> HttpResponse {
			self.calls.lock().push(RecordedCall {
				method,
				url: url.clone(),
				query: query.to_vec(),
				body: body.cloned(),
				headers: headers
					.iter()
					.map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
					.collect(),
			});

			self.routes
				.lock()
				.get_mut(last_segment(url))
				.and_then(VecDeque::pop_front)
				.unwrap_or_else(|| HttpResponse::new(500, r#"{"code":"-1","msg":"unscripted"}"#))
		}
	}
	impl FaceHttpClient for ScriptedTransport {
		fn get<'a>(
			&'a self,
			url: &'a Url,
			query: &'a [(String, String)],
			headers: Headers<'a>,
		) -> HttpFuture<'a> {
			let response = self.reply("GET", url, query, None, headers);

			Box::pin(async move { Ok(response) })
		}

		fn post<'a>(&'a self, url: &'a Url, body: &'a Value, headers: Headers<'a>) -> HttpFuture<'a> {
			let query = url
				.query_pairs()
				.map(|(key, value)| (key.into_owned(), value.into_owned()))
				.collect::<Vec<_>>();
			let response = self.reply("POST", url, &query, Some(body), headers);

			Box::pin(async move { Ok(response) })
		}
	}

	fn last_segment(url: &Url) -> &str {
		url.path().rsplit('/').next().unwrap_or_default()
	}
}
