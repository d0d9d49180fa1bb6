//! SDK-level error types shared across caches, signing, and client operations.

// self
use crate::{_prelude::*, auth::TicketKind};

/// SDK-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical SDK error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Remote API rejected the call with a non-success business code.
	#[error("Remote API rejected the {operation} call with code `{code}`: {message}.")]
	RemoteApi {
		/// Operation label that produced the rejection.
		operation: &'static str,
		/// Business code returned by the remote API.
		code: String,
		/// Message returned alongside the code.
		message: String,
	},
	/// A field required for signing was absent from the assembled request.
	#[error("Signing field `{field}` is missing from the request.")]
	MissingField {
		/// Name of the absent field.
		field: String,
	},
	/// Ticket endpoint answered successfully but returned no tickets.
	#[error("Ticket endpoint returned an empty {kind} ticket list.")]
	EmptyTicketList {
		/// Ticket kind that was requested.
		kind: TicketKind,
	},
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The application identifier was empty or missing.
	#[error("Application identifier is required.")]
	MissingAppId,
	/// The application secret was empty or missing.
	#[error("Application secret is required.")]
	MissingSecret,
	/// The API version string was empty.
	#[error("API version must not be empty.")]
	EmptyVersion,
	/// A configured URL cannot be parsed or joined.
	#[error("The {name} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed validation.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL cannot serve as a base for endpoint paths.
	#[error("The {name} URL cannot be used as a base: {url}.")]
	CannotBeBase {
		/// Which URL failed validation.
		name: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Refresh skew must not be negative.
	#[error("Refresh skew must not be negative.")]
	NegativeRefreshSkew,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Request timed out while calling the remote API.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Failures raised while decoding a remote response.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body is not valid JSON for the expected schema.
	#[error("The {operation} response is not valid JSON for the expected schema.")]
	Json {
		/// Operation label whose response failed to decode.
		operation: &'static str,
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// A successful response omitted a field it must carry.
	#[error("The {operation} response is missing the `{field}` field.")]
	MissingResponseField {
		/// Operation label whose response was incomplete.
		operation: &'static str,
		/// Name of the absent response field.
		field: &'static str,
	},
	/// An expiry timestamp did not match `YYYYMMDDhhmmss`.
	#[error("Expiry timestamp `{value}` does not match YYYYMMDDhhmmss.")]
	ExpireTime {
		/// Raw timestamp string.
		value: String,
		/// Underlying parse failure.
		#[source]
		source: time::error::Parse,
	},
	/// The request body could not be serialized.
	#[error("The {operation} request body could not be serialized.")]
	Serialize {
		/// Operation label whose request failed to serialize.
		operation: &'static str,
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
