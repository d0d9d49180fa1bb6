//! Credential-domain models: redacted secrets, access tokens, tickets, and freshness policies.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
