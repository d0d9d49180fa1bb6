//! Credential and ticket caches with serialized refreshes.
//!
//! Each cached value lives in a [`RefreshSlot`]: an async mutex around an optional value.
//! The read-check-refresh-write sequence runs entirely under the slot's lock, including the
//! remote exchange, so at most one refresh per slot is in flight and readers never observe a
//! partially updated value. Callers queued behind a refresh re-check freshness once they
//! acquire the lock and reuse the value the first caller stored.
//!
//! Holding the lock across the exchange means one slow call stalls every other caller of the
//! same slot until it completes or its future is dropped.

mod credential;
mod metrics;
mod ticket;

pub use credential::*;
pub use metrics::*;
pub use ticket::*;

// self
use crate::{_prelude::*, obs};

/// Single-value cache slot whose refreshes are serialized by an async mutex.
#[derive(Debug)]
pub struct RefreshSlot<T> {
	label: &'static str,
	value: AsyncMutex<Option<T>>,
	metrics: CacheMetrics,
}
impl<T> RefreshSlot<T>
where
	T: Clone,
{
	/// Creates an empty slot; `label` tags metrics emitted for it.
	pub fn new(label: &'static str) -> Self {
		Self { label, value: AsyncMutex::new(None), metrics: CacheMetrics::default() }
	}

	/// Returns the cached value when `reusable` accepts it; otherwise runs `refresh`, stores
	/// its result, and returns it.
	///
	/// A failed refresh leaves the previous value in place.
	pub async fn get_or_refresh<R, F, Fut>(&self, reusable: R, refresh: F) -> Result<T>
	where
		R: FnOnce(&T) -> bool,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let mut guard = self.value.lock().await;

		if let Some(current) = guard.as_ref().filter(|value| reusable(value)) {
			self.metrics.record_hit();
			obs::record_cache_lookup(self.label, false);

			return Ok(current.clone());
		}

		self.metrics.record_refresh();
		obs::record_cache_lookup(self.label, true);

		match refresh().await {
			Ok(fresh) => {
				*guard = Some(fresh.clone());

				Ok(fresh)
			},
			Err(e) => {
				self.metrics.record_failure();

				Err(e)
			},
		}
	}

	/// Returns a copy of the cached value, if any.
	pub async fn peek(&self) -> Option<T> {
		self.value.lock().await.clone()
	}

	/// Drops the cached value so the next lookup refreshes.
	pub async fn clear(&self) {
		self.value.lock().await.take();
	}

	/// Returns the usage counters for this slot.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}
}
