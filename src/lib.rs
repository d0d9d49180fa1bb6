//! Async client SDK for a face-verification cloud API: cached access tokens and tickets,
//! canonical SHA-1 request signing, and hosted verification URLs.
//!
//! ```no_run
//! # async fn demo() -> faceid_sdk::error::Result<()> {
//! use faceid_sdk::{
//! 	client::{FaceClient, HostedUrlRequest, VerificationRequest},
//! 	config::FaceConfig,
//! };
//!
//! let config = FaceConfig::builder("app-id", "app-secret").build()?;
//! let client = FaceClient::new(config)?;
//! let handle = client
//! 	.initiate_verification(&VerificationRequest::new("order-1", "Alice", "1101", "user-1"))
//! 	.await?;
//! let url = client
//! 	.build_hosted_url(&HostedUrlRequest::new(
//! 		&handle.order_no,
//! 		&handle.face_id,
//! 		"user-1",
//! 		"https://app.example.com/done",
//! 	))
//! 	.await?;
//!
//! println!("{url}");
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod sign;
pub mod upstream;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
