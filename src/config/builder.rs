// std
use std::time::Duration as StdDuration;
// crates.io
use time::UtcOffset;
// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_REFRESH_SKEW, RefreshPolicy, Secret},
	config::{DEFAULT_BASE_URL, DEFAULT_GRANT_TYPE, DEFAULT_VERSION, FaceConfig, FaceEndpoints},
	error::ConfigError,
};

/// Builder for [`FaceConfig`] values.
#[derive(Debug)]
pub struct FaceConfigBuilder {
	/// Application identifier (required).
	pub app_id: String,
	/// Application secret (required).
	pub secret: Secret,
	/// API version; defaults to [`DEFAULT_VERSION`].
	pub version: String,
	/// Token-exchange grant type; defaults to [`DEFAULT_GRANT_TYPE`].
	pub grant_type: String,
	/// API host; defaults to [`DEFAULT_BASE_URL`].
	pub base_url: Option<Url>,
	/// Hosted page host; defaults to the API host.
	pub optimal_domain: Option<Url>,
	/// Refresh margin; defaults to [`DEFAULT_REFRESH_SKEW`].
	pub refresh_skew: Duration,
	/// Freshness rule; defaults to [`RefreshPolicy::Preemptive`].
	pub refresh_policy: RefreshPolicy,
	/// Expiry offset; defaults to the local offset, or UTC when it cannot be determined.
	pub expiry_offset: Option<UtcOffset>,
	/// Per-request timeout for the default transport.
	pub request_timeout: Option<StdDuration>,
}
impl FaceConfigBuilder {
	/// Creates a new builder seeded with the provided credentials.
	pub fn new(app_id: impl Into<String>, secret: impl Into<Secret>) -> Self {
		Self {
			app_id: app_id.into(),
			secret: secret.into(),
			version: DEFAULT_VERSION.into(),
			grant_type: DEFAULT_GRANT_TYPE.into(),
			base_url: None,
			optimal_domain: None,
			refresh_skew: DEFAULT_REFRESH_SKEW,
			refresh_policy: RefreshPolicy::default(),
			expiry_offset: None,
			request_timeout: None,
		}
	}

	/// Overrides the API version.
	pub fn version(mut self, version: impl Into<String>) -> Self {
		self.version = version.into();

		self
	}

	/// Overrides the token-exchange grant type.
	pub fn grant_type(mut self, grant_type: impl Into<String>) -> Self {
		self.grant_type = grant_type.into();

		self
	}

	/// Points the API endpoints at an alternate host.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Points the hosted verification pages at an alternate host.
	pub fn optimal_domain(mut self, url: Url) -> Self {
		self.optimal_domain = Some(url);

		self
	}

	/// Overrides the refresh margin.
	pub fn refresh_skew(mut self, skew: Duration) -> Self {
		self.refresh_skew = skew;

		self
	}

	/// Overrides the freshness rule.
	pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
		self.refresh_policy = policy;

		self
	}

	/// Overrides the offset used to interpret expiry timestamps.
	pub fn expiry_offset(mut self, offset: UtcOffset) -> Self {
		self.expiry_offset = Some(offset);

		self
	}

	/// Bounds every HTTP call made by the default transport.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<FaceConfig, ConfigError> {
		if self.app_id.trim().is_empty() {
			return Err(ConfigError::MissingAppId);
		}
		if self.secret.is_blank() {
			return Err(ConfigError::MissingSecret);
		}
		if self.version.trim().is_empty() {
			return Err(ConfigError::EmptyVersion);
		}
		if self.refresh_skew.is_negative() {
			return Err(ConfigError::NegativeRefreshSkew);
		}

		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(DEFAULT_BASE_URL)
				.map_err(|source| ConfigError::InvalidUrl { name: "base", source })?,
		};
		let optimal_domain = self.optimal_domain.unwrap_or_else(|| base_url.clone());
		let endpoints = FaceEndpoints::resolve(&base_url, &optimal_domain)?;
		let expiry_offset = self
			.expiry_offset
			.unwrap_or_else(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC));

		Ok(FaceConfig {
			app_id: self.app_id,
			secret: self.secret,
			version: self.version,
			grant_type: self.grant_type,
			base_url,
			optimal_domain,
			endpoints,
			refresh_skew: self.refresh_skew,
			refresh_policy: self.refresh_policy,
			expiry_offset,
			request_timeout: self.request_timeout,
		})
	}
}
