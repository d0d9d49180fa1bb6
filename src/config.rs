//! Client configuration: credentials, endpoints, and cache freshness knobs.
//!
//! [`FaceConfig`] is immutable once built. Use [`FaceConfig::builder`] to assemble one; the
//! builder validates required credentials and URLs up front so a misconfigured client fails at
//! construction instead of on its first request.

/// Builder API for assembling client configuration.
pub mod builder;

pub use builder::*;

// std
use std::time::Duration as StdDuration;
// crates.io
use time::UtcOffset;
// self
use crate::{
	_prelude::*,
	auth::{RefreshPolicy, Secret},
	error::ConfigError,
};

/// Production host serving the API and the hosted verification pages.
pub const DEFAULT_BASE_URL: &str = "https://miniprogram-kyc.tencentcloudapi.com";
/// Default API version sent with every request.
pub const DEFAULT_VERSION: &str = "1.0.0";
/// Default grant type for the token exchange.
pub const DEFAULT_GRANT_TYPE: &str = "client_credential";

/// Resolved endpoint set derived from the configured base URL and optimal domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceEndpoints {
	/// Token-exchange endpoint.
	pub access_token: Url,
	/// Ticket issuance endpoint shared by API and nonce tickets.
	pub api_ticket: Url,
	/// Verification-initiation endpoint.
	pub initiate_verification: Url,
	/// Verification record query endpoint.
	pub query_record: Url,
	/// Hosted verification login page.
	pub hosted_login: Url,
}
impl FaceEndpoints {
	const ACCESS_TOKEN_PATH: &'static str = "api/oauth2/access_token";
	const API_TICKET_PATH: &'static str = "api/oauth2/api_ticket";
	const HOSTED_LOGIN_PATH: &'static str = "api/web/login";
	const INITIATE_VERIFICATION_PATH: &'static str = "api/server/h5/geth5faceid";
	const QUERY_RECORD_PATH: &'static str = "api/v2/base/queryfacerecord";

	/// Resolves every endpoint against `base_url` and `optimal_domain`.
	pub fn resolve(base_url: &Url, optimal_domain: &Url) -> Result<Self, ConfigError> {
		let base = as_base("base", base_url)?;
		let domain = as_base("optimal domain", optimal_domain)?;

		Ok(Self {
			access_token: join("base", &base, Self::ACCESS_TOKEN_PATH)?,
			api_ticket: join("base", &base, Self::API_TICKET_PATH)?,
			initiate_verification: join("base", &base, Self::INITIATE_VERIFICATION_PATH)?,
			query_record: join("base", &base, Self::QUERY_RECORD_PATH)?,
			hosted_login: join("optimal domain", &domain, Self::HOSTED_LOGIN_PATH)?,
		})
	}

	/// Resolves the hosted login page against an alternate domain.
	///
	/// The initiation call reports an `optimalDomain` per session; callers can route the hosted
	/// URL through it instead of the configured default.
	pub fn hosted_login_on(domain: &Url) -> Result<Url, ConfigError> {
		join("optimal domain", &as_base("optimal domain", domain)?, Self::HOSTED_LOGIN_PATH)
	}
}

/// Immutable configuration shared by every component of a client.
#[derive(Clone, Debug)]
pub struct FaceConfig {
	/// Application identifier issued by the remote service.
	pub app_id: String,
	/// Application secret used by the token exchange.
	pub secret: Secret,
	/// API version sent with every request.
	pub version: String,
	/// Grant type sent to the token exchange.
	pub grant_type: String,
	/// Host serving the token, ticket, initiation, and query endpoints.
	pub base_url: Url,
	/// Host serving the hosted verification pages.
	pub optimal_domain: Url,
	/// Endpoints resolved from `base_url` and `optimal_domain`.
	pub endpoints: FaceEndpoints,
	/// Margin before expiry at which cached values are refreshed.
	pub refresh_skew: Duration,
	/// Freshness rule applied by the caches.
	pub refresh_policy: RefreshPolicy,
	/// Offset used to interpret `YYYYMMDDhhmmss` expiry timestamps.
	pub expiry_offset: UtcOffset,
	/// Upper bound for each HTTP call made by the default transport.
	pub request_timeout: Option<StdDuration>,
}
impl FaceConfig {
	/// Creates a builder seeded with the provided credentials.
	pub fn builder(app_id: impl Into<String>, secret: impl Into<Secret>) -> FaceConfigBuilder {
		FaceConfigBuilder::new(app_id, secret)
	}
}

fn as_base(name: &'static str, url: &Url) -> Result<Url, ConfigError> {
	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeBase { name, url: url.to_string() });
	}

	let mut base = url.clone();

	if !base.path().ends_with('/') {
		let path = format!("{}/", base.path());

		base.set_path(&path);
	}

	Ok(base)
}

fn join(name: &'static str, base: &Url, path: &str) -> Result<Url, ConfigError> {
	base.join(path).map_err(|source| ConfigError::InvalidUrl { name, source })
}
