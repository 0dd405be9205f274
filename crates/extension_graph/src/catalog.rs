//! Atomically published extension graph.
//!
//! # Concurrency
//!
//! - **Reads:** Wait-free (atomic load of the current graph).
//! - **Writes:** [`ExtensionCatalog::publish`] swaps in a whole new graph with
//!   a read-copy-update loop, so revisions stay monotonic under concurrent
//!   publishers. Readers holding an older `Arc` keep a consistent view.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::graph::ExtensionGraph;

/// Source of the current extension graph snapshot.
pub trait ExtensionGraphProvider: Send + Sync {
	/// Returns the current snapshot.
	fn graph(&self) -> Arc<ExtensionGraph>;

	/// Returns the revision of the snapshot [`Self::graph`] would return now.
	///
	/// Consumers compare this against [`ExtensionGraph::revision`] to tell
	/// whether something they derived from a graph is outdated.
	fn revision(&self) -> u64 {
		0
	}
}

impl ExtensionGraphProvider for Arc<ExtensionGraph> {
	fn graph(&self) -> Arc<ExtensionGraph> {
		Arc::clone(self)
	}

	fn revision(&self) -> u64 {
		ExtensionGraph::revision(self)
	}
}

/// Holder of the current graph with lock-free reads and whole-graph swaps.
#[derive(Debug)]
pub struct ExtensionCatalog {
	current: ArcSwap<ExtensionGraph>,
}

impl ExtensionCatalog {
	/// Creates a catalog publishing `graph` as revision 1.
	pub fn new(mut graph: ExtensionGraph) -> Self {
		graph.set_revision(1);
		Self {
			current: ArcSwap::from_pointee(graph),
		}
	}

	/// Replaces the current graph, returning the revision it was assigned.
	pub fn publish(&self, graph: ExtensionGraph) -> u64 {
		let features = graph.len();
		let prev = self.current.rcu(|old| {
			let mut next = graph.clone();
			next.set_revision(old.revision() + 1);
			next
		});
		let revision = prev.revision() + 1;
		tracing::info!(revision, features, "extension_catalog.publish");
		revision
	}

	/// Returns the current graph snapshot.
	pub fn snapshot(&self) -> Arc<ExtensionGraph> {
		self.current.load_full()
	}
}

impl ExtensionGraphProvider for ExtensionCatalog {
	fn graph(&self) -> Arc<ExtensionGraph> {
		self.snapshot()
	}

	fn revision(&self) -> u64 {
		self.current.load().revision()
	}
}
