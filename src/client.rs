//! High-level client exposing the verification operations.
//!
//! [`FaceClient`] owns the shared configuration, transport, and caches. Clones share the same
//! caches, so one client can be handed to every task of a service. Each operation resolves the
//! credential and ticket it needs, assembles the request fields, signs them, and performs a
//! single transport call.

mod hosted;
mod record;
mod verification;

pub use hosted::*;
pub use record::*;
pub use verification::*;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	cache::{CacheMetrics, CredentialCache, TicketCache},
	clock::{Clock, SystemClock},
	config::FaceConfig,
	http::FaceHttpClient,
	upstream::Upstream,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestFaceClient = FaceClient<ReqwestHttpClient>;

/// Verification API client with shared credential and ticket caches.
pub struct FaceClient<C>
where
	C: ?Sized + FaceHttpClient,
{
	upstream: Arc<Upstream<C>>,
	credentials: Arc<CredentialCache<C>>,
	tickets: Arc<TicketCache<C>>,
}
impl<C> FaceClient<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: FaceConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self::with_parts(config, http_client.into(), Arc::new(SystemClock))
	}

	/// Creates a client from explicit parts, including the time source used by the caches.
	pub fn with_parts(config: FaceConfig, http_client: Arc<C>, clock: Arc<dyn Clock>) -> Self {
		let upstream = Arc::new(Upstream::new(config, http_client, clock));
		let credentials = Arc::new(CredentialCache::new(upstream.clone()));
		let tickets = Arc::new(TicketCache::new(upstream.clone(), credentials.clone()));

		Self { upstream, credentials, tickets }
	}

	/// Rebuilds the client around another time source.
	///
	/// The returned client starts with empty caches.
	pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
		Self::with_parts(self.upstream.config.clone(), self.upstream.http_client.clone(), clock)
	}

	/// Returns the immutable configuration.
	pub fn config(&self) -> &FaceConfig {
		&self.upstream.config
	}

	/// Returns the transport shared by every operation.
	pub fn http_client(&self) -> &Arc<C> {
		&self.upstream.http_client
	}

	/// Returns the credential cache.
	pub fn credentials(&self) -> &CredentialCache<C> {
		&self.credentials
	}

	/// Returns the ticket cache.
	pub fn tickets(&self) -> &TicketCache<C> {
		&self.tickets
	}

	/// Returns hit/refresh/failure counters for the access-token cache.
	pub fn credential_metrics(&self) -> &CacheMetrics {
		self.credentials.metrics()
	}

	/// Returns hit/refresh/failure counters for the API ticket cache.
	pub fn ticket_metrics(&self) -> &CacheMetrics {
		self.tickets.api_metrics()
	}

	/// Returns a usable access token.
	pub async fn get_access_token(&self) -> Result<Secret> {
		self.credentials.get_access_token().await
	}

	/// Returns a usable API ticket.
	pub async fn get_api_ticket(&self) -> Result<Secret> {
		self.tickets.get_api_ticket().await
	}

	/// Returns a usable nonce ticket for `user_id`.
	pub async fn get_nonce_ticket(&self, user_id: &str) -> Result<Secret> {
		self.tickets.get_nonce_ticket(user_id).await
	}
}
#[cfg(feature = "reqwest")]
impl FaceClient<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest transport.
	///
	/// The transport applies [`FaceConfig::request_timeout`] to every call.
	pub fn new(config: FaceConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;
		let transport = ReqwestHttpClient::with_client(client).with_timeout(config.request_timeout);

		Ok(Self::with_http_client(config, transport))
	}
}
impl<C> Clone for FaceClient<C>
where
	C: ?Sized + FaceHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			upstream: self.upstream.clone(),
			credentials: self.credentials.clone(),
			tickets: self.tickets.clone(),
		}
	}
}
impl<C> Debug for FaceClient<C>
where
	C: ?Sized + FaceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FaceClient")
			.field("config", &self.upstream.config)
			.field("credentials", &self.credentials)
			.field("tickets", &self.tickets)
			.finish()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	// crates.io
	use time::{UtcOffset, macros::datetime};
	// self
	use super::*;
	use crate::{clock::ManualClock, http::scripted::ScriptedTransport};

	pub(crate) const TOKEN: &str =
		r#"{"code":"0","access_token":"tok123","expire_time":"20300101020000"}"#;

	pub(crate) fn ticket_body(value: &str) -> String {
		format!(r#"{{"code":"0","tickets":[{{"value":"{value}","expire_time":"20300101010000"}}]}}"#)
	}

	pub(crate) fn build_client(
		transport: ScriptedTransport,
	) -> (FaceClient<ScriptedTransport>, Arc<ScriptedTransport>) {
		let config = FaceConfig::builder("A1", "S1")
			.expiry_offset(UtcOffset::UTC)
			.optimal_domain(Url::parse("https://kyc1.example.com").expect("Domain should parse."))
			.build()
			.expect("Test config should build.");
		let transport = Arc::new(transport);
		let clock = ManualClock::new(datetime!(2030-01-01 00:00 UTC));
		let client = FaceClient::with_parts(config, transport.clone(), Arc::new(clock));

		(client, transport)
	}

	#[tokio::test]
	async fn clones_share_caches() {
		let (client, transport) = build_client(
			ScriptedTransport::default()
				.respond("access_token", TOKEN)
				.respond("api_ticket", &ticket_body("tk1")),
		);
		let clone = client.clone();
		let first = client.get_api_ticket().await.expect("Ticket exchange succeeds.");
		let second = clone.get_api_ticket().await.expect("Clone reuses the ticket.");

		assert_eq!(first, second);
		assert_eq!(transport.count("access_token"), 1);
		assert_eq!(transport.count("api_ticket"), 1);
		assert_eq!(clone.credential_metrics().refreshes(), 1);
		assert_eq!(clone.ticket_metrics().refreshes(), 1);
		assert_eq!(clone.ticket_metrics().hits(), 1);
	}

	#[tokio::test]
	async fn with_clock_starts_from_empty_caches() {
		let (client, transport) = build_client(
			ScriptedTransport::default()
				.respond("access_token", TOKEN)
				.respond("access_token", TOKEN),
		);

		client.get_access_token().await.expect("First exchange succeeds.");

		let client = client.with_clock(Arc::new(SystemClock));

		assert!(client.credentials().peek().await.is_none());

		client.get_access_token().await.expect("Second exchange succeeds.");

		assert_eq!(transport.count("access_token"), 2);
	}
}
