//! Access-token cache backed by the token-exchange endpoint.

// self
use crate::{
	_prelude::*,
	auth::{Credential, Secret, parse_expire_time},
	cache::{CacheMetrics, RefreshSlot},
	http::FaceHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	upstream::{self, Upstream},
};

#[derive(Debug, Serialize)]
struct AccessTokenQuery<'a> {
	app_id: &'a str,
	secret: &'a str,
	version: &'a str,
	grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
	#[serde(deserialize_with = "upstream::code")]
	code: String,
	#[serde(default)]
	msg: String,
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expire_time: Option<String>,
}

/// Caches the access token and exchanges app credentials for a new one when it goes stale.
pub struct CredentialCache<C>
where
	C: ?Sized + FaceHttpClient,
{
	upstream: Arc<Upstream<C>>,
	slot: RefreshSlot<Credential>,
}
impl<C> CredentialCache<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Creates an empty cache bound to the shared client state.
	pub fn new(upstream: Arc<Upstream<C>>) -> Self {
		Self { upstream, slot: RefreshSlot::new("credential") }
	}

	/// Returns a usable access token, exchanging app credentials when the cached one is stale.
	pub async fn get_access_token(&self) -> Result<Secret> {
		self.get_credential().await.map(|credential| credential.token)
	}

	/// Returns the cached or freshly exchanged [`Credential`], including its expiry.
	pub async fn get_credential(&self) -> Result<Credential> {
		const KIND: Operation = Operation::AccessToken;

		let span = OperationSpan::new(KIND, "get_access_token");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = &self.upstream.config;
				let now = self.upstream.now();

				self.slot
					.get_or_refresh(
						|current| {
							current.is_reusable_at(now, config.refresh_policy, config.refresh_skew)
						},
						|| self.exchange(),
					)
					.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Returns the cached credential without contacting the remote API.
	pub async fn peek(&self) -> Option<Credential> {
		self.slot.peek().await
	}

	/// Drops the cached credential so the next lookup exchanges.
	pub async fn invalidate(&self) {
		self.slot.clear().await;
	}

	/// Returns hit/refresh/failure counters for this cache.
	pub fn metrics(&self) -> &CacheMetrics {
		self.slot.metrics()
	}

	async fn exchange(&self) -> Result<Credential> {
		const KIND: Operation = Operation::AccessToken;

		let config = &self.upstream.config;
		let query = upstream::query_pairs(
			KIND,
			&AccessTokenQuery {
				app_id: &config.app_id,
				secret: config.secret.expose(),
				version: &config.version,
				grant_type: &config.grant_type,
			},
		)?;
		let response: AccessTokenResponse =
			self.upstream.get_json(KIND, &config.endpoints.access_token, &query).await?;

		upstream::ensure_success(KIND, &response.code, &response.msg)?;

		let token = upstream::required(KIND, "access_token", response.access_token)?;
		let expire_time = upstream::required(KIND, "expire_time", response.expire_time)?;
		let expires_at = parse_expire_time(&expire_time, config.expiry_offset)?;

		Ok(Credential::new(token, expires_at))
	}
}
impl<C> Debug for CredentialCache<C>
where
	C: ?Sized + FaceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache").field("metrics", self.slot.metrics()).finish()
	}
}
