//! Cached access tokens and tickets plus the freshness rules applied to them.

// crates.io
use time::{PrimitiveDateTime, UtcOffset, macros::format_description};
// self
use crate::{_prelude::*, auth::Secret, error::DecodeError};

/// Default margin before expiry at which cached values are refreshed.
pub const DEFAULT_REFRESH_SKEW: Duration = Duration::minutes(10);

/// Decides whether a cached value may be served at a given instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
	/// Reuse while `now + skew < expires_at`; refresh `skew` before expiry.
	#[default]
	Preemptive,
	/// Reuse only when `now - skew > expires_at`; exchange otherwise.
	///
	/// Matches the comparison used by the upstream reference client. Under this policy every
	/// call exchanges until the cached value is more than `skew` past its expiry, after which
	/// the stale value is served.
	LegacyInverted,
}
impl RefreshPolicy {
	/// Returns `true` when a value expiring at `expires_at` may be reused at `now`.
	pub fn is_reusable(
		self,
		expires_at: OffsetDateTime,
		now: OffsetDateTime,
		skew: Duration,
	) -> bool {
		match self {
			Self::Preemptive => now + skew < expires_at,
			Self::LegacyInverted => now - skew > expires_at,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Preemptive => "preemptive",
			Self::LegacyInverted => "legacy_inverted",
		}
	}
}

/// Access token issued by the token-exchange endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	/// Bearer token; callers must avoid logging it.
	pub token: Secret,
	/// Absolute expiry reported by the remote API.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Creates a credential from a token and its expiry.
	pub fn new(token: impl Into<Secret>, expires_at: OffsetDateTime) -> Self {
		Self { token: token.into(), expires_at }
	}

	/// Returns `true` when the credential may be served at `now` under `policy`.
	pub fn is_reusable_at(
		&self,
		now: OffsetDateTime,
		policy: RefreshPolicy,
		skew: Duration,
	) -> bool {
		policy.is_reusable(self.expires_at, now, skew)
	}
}

/// Ticket flavors issued by the ticket endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
	/// App-level signing ticket used by server-side calls.
	Api,
	/// Per-user ticket used by hosted verification URLs.
	Nonce,
}
impl TicketKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Api => "api",
			Self::Nonce => "nonce",
		}
	}
}
impl Display for TicketKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Ticket derived from an access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
	/// Ticket value; callers must avoid logging it.
	pub value: Secret,
	/// Absolute expiry reported by the remote API.
	pub expires_at: OffsetDateTime,
	/// Ticket flavor.
	pub kind: TicketKind,
	/// User the ticket was issued for (nonce tickets only).
	pub user_id: Option<String>,
}
impl Ticket {
	/// Creates an API ticket.
	pub fn api(value: impl Into<Secret>, expires_at: OffsetDateTime) -> Self {
		Self { value: value.into(), expires_at, kind: TicketKind::Api, user_id: None }
	}

	/// Creates a nonce ticket bound to `user_id`.
	pub fn nonce(
		value: impl Into<Secret>,
		expires_at: OffsetDateTime,
		user_id: impl Into<String>,
	) -> Self {
		Self {
			value: value.into(),
			expires_at,
			kind: TicketKind::Nonce,
			user_id: Some(user_id.into()),
		}
	}

	/// Returns `true` when the ticket may be served to `user_id` at `now` under `policy`.
	pub fn is_reusable_for(
		&self,
		user_id: Option<&str>,
		now: OffsetDateTime,
		policy: RefreshPolicy,
		skew: Duration,
	) -> bool {
		self.user_id.as_deref() == user_id && policy.is_reusable(self.expires_at, now, skew)
	}
}

/// Parses a `YYYYMMDDhhmmss` timestamp interpreted at `offset`.
pub fn parse_expire_time(value: &str, offset: UtcOffset) -> Result<OffsetDateTime, DecodeError> {
	PrimitiveDateTime::parse(value, format_description!("[year][month][day][hour][minute][second]"))
		.map(|moment| moment.assume_offset(offset))
		.map_err(|source| DecodeError::ExpireTime { value: value.to_owned(), source })
}
