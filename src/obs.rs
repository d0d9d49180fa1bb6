//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `faceid.operation` with the `operation`
//!   and `stage` (call site) fields.
//! - Enable `metrics` to increment the `faceid_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Access-token exchange.
	AccessToken,
	/// API ticket issuance.
	ApiTicket,
	/// Nonce ticket issuance.
	NonceTicket,
	/// Verification-session initiation.
	InitiateVerification,
	/// Hosted verification URL construction.
	HostedUrl,
	/// Verification record query.
	QueryRecord,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::AccessToken => "access_token",
			Operation::ApiTicket => "api_ticket",
			Operation::NonceTicket => "nonce_ticket",
			Operation::InitiateVerification => "initiate_verification",
			Operation::HostedUrl => "hosted_url",
			Operation::QueryRecord => "query_record",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
