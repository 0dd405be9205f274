//! Volatility tokens.
//!
//! A cached table stays valid while every token captured during its build
//! reports [`VolatileToken::is_current`]. Tokens are polled on access; there
//! is no push notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Polled validity flag for something a shape table was derived from.
pub trait VolatileToken: Send + Sync {
	fn is_current(&self) -> bool;
}

/// Source of tokens registered on every build, independent of providers.
pub trait ShapeTableMonitor: Send + Sync {
	fn monitor(&self, register: &mut dyn FnMut(Arc<dyn VolatileToken>));
}

/// Manually triggered invalidation source.
///
/// Every token handed out before a [`Signal::trigger`] becomes stale.
#[derive(Debug, Default, Clone)]
pub struct Signal {
	generation: Arc<AtomicU64>,
}

impl Signal {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a token bound to the current generation.
	pub fn token(&self) -> SignalToken {
		SignalToken {
			generation: Arc::clone(&self.generation),
			observed: self.generation.load(Ordering::Acquire),
		}
	}

	/// Invalidates every outstanding token.
	pub fn trigger(&self) {
		let generation = self.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
		tracing::debug!(generation, "shape_signal.trigger");
	}
}

impl ShapeTableMonitor for Signal {
	fn monitor(&self, register: &mut dyn FnMut(Arc<dyn VolatileToken>)) {
		register(Arc::new(self.token()));
	}
}

#[derive(Debug, Clone)]
pub struct SignalToken {
	generation: Arc<AtomicU64>,
	observed: u64,
}

impl VolatileToken for SignalToken {
	fn is_current(&self) -> bool {
		self.generation.load(Ordering::Acquire) == self.observed
	}
}

/// Token that never goes stale.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permanent;

impl VolatileToken for Permanent {
	fn is_current(&self) -> bool {
		true
	}
}
