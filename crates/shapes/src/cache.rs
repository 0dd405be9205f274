//! Per-theme shape table cache with single-flight builds.
//!
//! # Invariants
//!
//! - At most one build runs per key at a time; concurrent callers for a
//!   missing key wait for that build and share its result.
//!   - Enforced in: [`ShapeTableCache::get_or_build`] (one [`OnceLock`] per
//!     slot, initialized outside the map lock)
//!   - Tested by: `cache::tests::concurrent_misses_share_one_build`
//! - A build for one key never blocks lookups of another key.
//!   - Enforced in: `ShapeTableCache::slot` (map lock held only to fetch
//!     or insert the slot)
//!   - Tested by: `cache::tests::slow_build_does_not_block_other_keys`
//! - Failed builds are never retained.
//!   - Enforced in: `ShapeTableCache::evict`
//!   - Tested by: `cache::tests::failed_build_is_retried`,
//!     `cache::tests::concurrent_failures_share_one_error`
//! - A stale entry is rebuilt on the next access.
//!   - Enforced in: `CachedTable::is_current`
//!   - Tested by: `cache::tests::stale_token_forces_rebuild`
//!
//! Eviction only removes a slot if it is still the one the caller observed,
//! so a late eviction cannot discard a newer build.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use vellum_extension_graph::Key;

use crate::error::ShapeError;
use crate::table::ShapeTable;
use crate::volatile::VolatileToken;

/// Output of one successful build.
pub struct BuiltTable {
	pub table: ShapeTable,
	pub tokens: Vec<Arc<dyn VolatileToken>>,
}

struct CachedTable {
	table: Arc<ShapeTable>,
	tokens: Vec<Arc<dyn VolatileToken>>,
	/// Build number assigned by the cache's generation clock.
	generation: u64,
}

impl CachedTable {
	/// True while every token captured during the build is current.
	fn is_current(&self) -> bool {
		self.tokens.iter().all(|token| token.is_current())
	}
}

#[derive(Default)]
struct Slot {
	result: OnceLock<Result<CachedTable, ShapeError>>,
}

/// Theme-keyed cache of built tables.
#[derive(Default)]
pub struct ShapeTableCache {
	slots: Mutex<FxHashMap<Key, Arc<Slot>>>,
	generation: AtomicU64,
}

impl ShapeTableCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached table for `key`, building it with `build` on a miss
	/// or when the cached entry has gone stale.
	///
	/// A caller whose own `build` produced the entry always receives it, even
	/// if a token went stale while building.
	pub fn get_or_build<F>(&self, key: &Key, mut build: F) -> Result<Arc<ShapeTable>, ShapeError>
	where
		F: FnMut() -> Result<BuiltTable, ShapeError>,
	{
		loop {
			let slot = self.slot(key);
			let mut built_here = false;
			let result = slot.result.get_or_init(|| {
				built_here = true;
				build().map(|built| {
					let generation = self.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
					CachedTable {
						table: Arc::new(built.table),
						tokens: built.tokens,
						generation,
					}
				})
			});

			match result {
				Ok(cached) if built_here || cached.is_current() => {
					tracing::trace!(theme = %key, generation = cached.generation, built_here, "shape_table_cache.get");
					return Ok(Arc::clone(&cached.table));
				}
				Ok(cached) => {
					tracing::debug!(theme = %key, generation = cached.generation, "shape_table_cache.stale");
					self.evict(key, &slot);
				}
				Err(error) => {
					self.evict(key, &slot);
					return Err(error.clone());
				}
			}
		}
	}

	/// Returns the ready entry for `key` without building, if any.
	pub fn peek(&self, key: &Key) -> Option<Arc<ShapeTable>> {
		let slot = self.slots.lock().get(key).cloned()?;
		match slot.result.get()? {
			Ok(cached) if cached.is_current() => Some(Arc::clone(&cached.table)),
			_ => None,
		}
	}

	/// Drops the entry for `key`. Returns whether one was present.
	pub fn invalidate(&self, key: &Key) -> bool {
		let removed = self.slots.lock().remove(key).is_some();
		if removed {
			tracing::debug!(theme = %key, "shape_table_cache.invalidate");
		}
		removed
	}

	pub fn clear(&self) {
		let mut slots = self.slots.lock();
		let dropped = slots.len();
		slots.clear();
		tracing::debug!(dropped, "shape_table_cache.clear");
	}

	/// Number of keys with a ready or in-flight entry.
	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}

	/// Number of successful builds so far.
	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	fn slot(&self, key: &Key) -> Arc<Slot> {
		let mut slots = self.slots.lock();
		Arc::clone(slots.entry(key.clone()).or_default())
	}

	fn evict(&self, key: &Key, observed: &Arc<Slot>) {
		let mut slots = self.slots.lock();
		if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, observed)) {
			slots.remove(key);
		}
	}
}

impl fmt::Debug for ShapeTableCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShapeTableCache")
			.field("keys", &self.len())
			.field("generation", &self.generation())
			.finish()
	}
}
