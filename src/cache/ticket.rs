//! API and nonce ticket caches layered on top of the credential cache.
//!
//! Both ticket kinds come from the same endpoint and are requested with `type=SIGN`; nonce
//! tickets add a `user_id` discriminator. The nonce cache keeps a single slot tagged with the
//! user it was issued for, so alternating users trigger a fresh exchange each time.
//!
//! The access token is resolved before a ticket slot is locked; the credential and ticket
//! locks are never held at the same time.

// self
use crate::{
	_prelude::*,
	auth::{Secret, Ticket, TicketKind, parse_expire_time},
	cache::{CacheMetrics, CredentialCache, RefreshSlot},
	http::FaceHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	upstream::{self, Upstream},
};

/// Ticket type requested for both API and nonce tickets.
pub const SIGN_TICKET_TYPE: &str = "SIGN";

#[derive(Debug, Serialize)]
struct TicketQuery<'a> {
	app_id: &'a str,
	access_token: &'a str,
	#[serde(rename = "type")]
	kind: &'a str,
	version: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	user_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TicketResponse {
	#[serde(deserialize_with = "upstream::code")]
	code: String,
	#[serde(default)]
	msg: String,
	#[serde(default)]
	tickets: Vec<TicketEntry>,
}

#[derive(Debug, Deserialize)]
struct TicketEntry {
	value: String,
	expire_time: String,
}

/// Caches the API ticket and the most recent nonce ticket.
pub struct TicketCache<C>
where
	C: ?Sized + FaceHttpClient,
{
	upstream: Arc<Upstream<C>>,
	credentials: Arc<CredentialCache<C>>,
	api: RefreshSlot<Ticket>,
	nonce: RefreshSlot<Ticket>,
}
impl<C> TicketCache<C>
where
	C: ?Sized + FaceHttpClient,
{
	/// Creates empty ticket slots that draw access tokens from `credentials`.
	pub fn new(upstream: Arc<Upstream<C>>, credentials: Arc<CredentialCache<C>>) -> Self {
		Self {
			upstream,
			credentials,
			api: RefreshSlot::new("api_ticket"),
			nonce: RefreshSlot::new("nonce_ticket"),
		}
	}

	/// Returns a usable API ticket, refreshing it (and the access token if needed) when stale.
	pub async fn get_api_ticket(&self) -> Result<Secret> {
		self.ticket(TicketKind::Api, None).await.map(|ticket| ticket.value)
	}

	/// Returns a usable nonce ticket bound to `user_id`.
	pub async fn get_nonce_ticket(&self, user_id: &str) -> Result<Secret> {
		self.ticket(TicketKind::Nonce, Some(user_id)).await.map(|ticket| ticket.value)
	}

	/// Returns the cached API ticket without contacting the remote API.
	pub async fn peek_api_ticket(&self) -> Option<Ticket> {
		self.api.peek().await
	}

	/// Returns the cached nonce ticket without contacting the remote API.
	pub async fn peek_nonce_ticket(&self) -> Option<Ticket> {
		self.nonce.peek().await
	}

	/// Drops both cached tickets so the next lookups exchange.
	pub async fn invalidate(&self) {
		self.api.clear().await;
		self.nonce.clear().await;
	}

	/// Returns hit/refresh/failure counters for the API ticket slot.
	pub fn api_metrics(&self) -> &CacheMetrics {
		self.api.metrics()
	}

	/// Returns hit/refresh/failure counters for the nonce ticket slot.
	pub fn nonce_metrics(&self) -> &CacheMetrics {
		self.nonce.metrics()
	}

	async fn ticket(&self, kind: TicketKind, user_id: Option<&str>) -> Result<Ticket> {
		let (operation, slot) = match kind {
			TicketKind::Api => (Operation::ApiTicket, &self.api),
			TicketKind::Nonce => (Operation::NonceTicket, &self.nonce),
		};
		let span = OperationSpan::new(operation, "get_ticket");

		obs::record_operation_outcome(operation, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let access_token = self.credentials.get_access_token().await?;
				let config = &self.upstream.config;
				let now = self.upstream.now();

				slot.get_or_refresh(
					|current| {
						current.is_reusable_for(
							user_id,
							now,
							config.refresh_policy,
							config.refresh_skew,
						)
					},
					|| self.exchange(operation, kind, &access_token, user_id),
				)
				.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(operation, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(operation, OperationOutcome::Failure),
		}

		result
	}

	async fn exchange(
		&self,
		operation: Operation,
		kind: TicketKind,
		access_token: &Secret,
		user_id: Option<&str>,
	) -> Result<Ticket> {
		let config = &self.upstream.config;
		let query = upstream::query_pairs(
			operation,
			&TicketQuery {
				app_id: &config.app_id,
				access_token: access_token.expose(),
				kind: SIGN_TICKET_TYPE,
				version: &config.version,
				user_id,
			},
		)?;
		let response: TicketResponse =
			self.upstream.get_json(operation, &config.endpoints.api_ticket, &query).await?;

		upstream::ensure_success(operation, &response.code, &response.msg)?;

		let entry = response.tickets.into_iter().next().ok_or(Error::EmptyTicketList { kind })?;
		let expires_at = parse_expire_time(&entry.expire_time, config.expiry_offset)?;

		Ok(match user_id {
			Some(user_id) => Ticket::nonce(entry.value, expires_at, user_id),
			None => Ticket::api(entry.value, expires_at),
		})
	}
}
impl<C> Debug for TicketCache<C>
where
	C: ?Sized + FaceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TicketCache")
			.field("api", self.api.metrics())
			.field("nonce", self.nonce.metrics())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::{UtcOffset, macros::datetime};
	// self
	use super::*;
	use crate::{
		auth::RefreshPolicy, clock::ManualClock, config::FaceConfig,
		http::scripted::ScriptedTransport,
	};

	const TOKEN: &str = r#"{"code":"0","access_token":"tok123","expire_time":"20300101020000"}"#;

	fn ticket_body(value: &str, expire_time: &str) -> String {
		format!(r#"{{"code":"0","tickets":[{{"value":"{value}","expire_time":"{expire_time}"}}]}}"#)
	}

	fn build_cache(
		transport: ScriptedTransport,
		policy: RefreshPolicy,
	) -> (TicketCache<ScriptedTransport>, Arc<ScriptedTransport>, ManualClock) {
		let config = FaceConfig::builder("A1", "S1")
			.expiry_offset(UtcOffset::UTC)
			.refresh_policy(policy)
			.build()
			.expect("Test config should build.");
		let transport = Arc::new(transport);
		let clock = ManualClock::new(datetime!(2030-01-01 00:00 UTC));
		let upstream = Arc::new(Upstream::new(config, transport.clone(), Arc::new(clock.clone())));
		let credentials = Arc::new(CredentialCache::new(upstream.clone()));

		(TicketCache::new(upstream, credentials), transport, clock)
	}

	#[tokio::test]
	async fn api_ticket_uses_the_cached_token() {
		let (cache, transport, _) = build_cache(
			ScriptedTransport::default().respond("access_token", TOKEN).respond(
				"api_ticket",
				r#"{"code":"0","msg":"success","tickets":[{"value":"tk1","expire_time":"20300101010000","expire_in":3600},{"value":"tk2","expire_time":"20300101010000","expire_in":3600}]}"#,
			),
			RefreshPolicy::Preemptive,
		);
		let first = cache.get_api_ticket().await.expect("Ticket exchange succeeds.");
		let second = cache.get_api_ticket().await.expect("Cached ticket is reused.");

		assert_eq!(first.expose(), "tk1");
		assert_eq!(second.expose(), "tk1");
		assert_eq!(transport.count("access_token"), 1);
		assert_eq!(transport.count("api_ticket"), 1);

		let calls = transport.calls();
		let ticket_call = calls
			.iter()
			.find(|call| call.endpoint() == "api_ticket")
			.expect("Ticket endpoint was called.");

		assert_eq!(ticket_call.query_value("app_id"), Some("A1"));
		assert_eq!(ticket_call.query_value("access_token"), Some("tok123"));
		assert_eq!(ticket_call.query_value("type"), Some("SIGN"));
		assert_eq!(ticket_call.query_value("version"), Some("1.0.0"));
		assert_eq!(ticket_call.query_value("user_id"), None);
	}

	#[tokio::test]
	async fn empty_ticket_lists_are_typed_errors() {
		let (cache, _, _) = build_cache(
			ScriptedTransport::default()
				.respond("access_token", TOKEN)
				.respond("api_ticket", r#"{"code":"0","tickets":[]}"#),
			RefreshPolicy::Preemptive,
		);
		let err = cache.get_api_ticket().await.expect_err("Empty lists are rejected.");

		assert!(matches!(err, Error::EmptyTicketList { kind: TicketKind::Api }));
		assert!(cache.peek_api_ticket().await.is_none());
	}

	#[tokio::test]
	async fn nonce_tickets_are_scoped_to_the_last_user() {
		let (cache, transport, _) = build_cache(
			ScriptedTransport::default()
				.respond("access_token", TOKEN)
				.respond("api_ticket", &ticket_body("n1", "20300101010000"))
				.respond("api_ticket", &ticket_body("n2", "20300101010000"))
				.respond("api_ticket", &ticket_body("n3", "20300101010000")),
			RefreshPolicy::Preemptive,
		);

		let alice = cache.get_nonce_ticket("alice").await.expect("First nonce succeeds.");
		let alice_again = cache.get_nonce_ticket("alice").await.expect("Nonce is reused.");
		let bob = cache.get_nonce_ticket("bob").await.expect("Other user exchanges.");
		let alice_last = cache.get_nonce_ticket("alice").await.expect("Slot was replaced.");

		assert_eq!(alice.expose(), "n1");
		assert_eq!(alice_again.expose(), "n1");
		assert_eq!(bob.expose(), "n2");
		assert_eq!(alice_last.expose(), "n3");
		assert_eq!(transport.count("api_ticket"), 3);
		assert_eq!(transport.count("access_token"), 1);

		let calls = transport.calls();
		let users = calls
			.iter()
			.filter(|call| call.endpoint() == "api_ticket")
			.map(|call| call.query_value("user_id").map(str::to_owned))
			.collect::<Vec<_>>();

		assert_eq!(
			users,
			vec![Some("alice".to_owned()), Some("bob".to_owned()), Some("alice".to_owned())]
		);
		assert!(calls
			.iter()
			.filter(|call| call.endpoint() == "api_ticket")
			.all(|call| call.query_value("type") == Some("SIGN")));
	}

	#[tokio::test]
	async fn preemptive_policy_refreshes_inside_the_skew_window() {
		let (cache, transport, clock) = build_cache(
			ScriptedTransport::default()
				.respond("access_token", TOKEN)
				.respond("api_ticket", &ticket_body("tk1", "20300101010000"))
				.respond("api_ticket", &ticket_body("tk2", "20300101020000")),
			RefreshPolicy::Preemptive,
		);

		cache.get_api_ticket().await.expect("First exchange succeeds.");
		clock.set(datetime!(2030-01-01 00:49 UTC));

		let early = cache.get_api_ticket().await.expect("Ticket outside the window is reused.");

		assert_eq!(early.expose(), "tk1");
		assert_eq!(transport.count("api_ticket"), 1);

		clock.set(datetime!(2030-01-01 00:51 UTC));

		let refreshed = cache.get_api_ticket().await.expect("Ticket inside the window refreshes.");

		assert_eq!(refreshed.expose(), "tk2");
		assert_eq!(transport.count("api_ticket"), 2);
		assert_eq!(transport.count("access_token"), 1);
		assert_eq!(cache.api_metrics().refreshes(), 2);
	}

	#[tokio::test]
	async fn legacy_policy_exchanges_while_the_ticket_is_live() {
		let (cache, transport, clock) = build_cache(
			ScriptedTransport::default()
				.respond(
					"access_token",
					r#"{"code":"0","access_token":"tok1","expire_time":"20290101000000"}"#,
				)
				.respond("api_ticket", &ticket_body("tk1", "20300101010000"))
				.respond("api_ticket", &ticket_body("tk2", "20300101010000")),
			RefreshPolicy::LegacyInverted,
		);

		cache.get_api_ticket().await.expect("First exchange succeeds.");

		let again = cache.get_api_ticket().await.expect("Second exchange succeeds.");

		assert_eq!(again.expose(), "tk2");
		assert_eq!(transport.count("api_ticket"), 2);

		clock.set(datetime!(2030-01-01 01:11 UTC));

		let stale = cache.get_api_ticket().await.expect("Past-expiry ticket is served.");

		assert_eq!(stale.expose(), "tk2");
		assert_eq!(transport.count("api_ticket"), 2);
		assert_eq!(transport.count("access_token"), 1);
	}
}
