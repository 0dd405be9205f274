//! Shape table orchestration.
//!
//! A build runs providers, keeps the alterations applicable to the requested
//! theme, orders them by feature dependencies and priority, merges them into
//! a [`ShapeTable`], notifies event handlers and collects volatility tokens.
//! Builds are cached per theme by [`ShapeTableCache`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use vellum_extension_graph::{ExtensionGraphProvider, Key};

use crate::alteration::order_alterations;
use crate::builder::Discovery;
use crate::cache::{BuiltTable, ShapeTableCache};
use crate::config::ShapeTableConfig;
use crate::error::{ConfigError, ShapeError};
use crate::events::{ShapeTableEventHandler, notify_created};
use crate::filter::is_applicable;
use crate::provider::{ShapeTableProvider, discover_all};
use crate::table::ShapeTable;
use crate::volatile::{ShapeTableMonitor, VolatileToken};

/// Builds and caches shape tables per theme.
pub struct ShapeTableManager {
	graphs: Arc<dyn ExtensionGraphProvider>,
	providers: Vec<Arc<dyn ShapeTableProvider>>,
	handlers: Vec<Arc<dyn ShapeTableEventHandler>>,
	monitors: Vec<Arc<dyn ShapeTableMonitor>>,
	config: ShapeTableConfig,
	cache: ShapeTableCache,
}

impl ShapeTableManager {
	pub fn builder(graphs: Arc<dyn ExtensionGraphProvider>) -> ShapeTableManagerBuilder {
		ShapeTableManagerBuilder {
			graphs,
			providers: Vec::new(),
			handlers: Vec::new(),
			monitors: Vec::new(),
			config: ShapeTableConfig::default(),
		}
	}

	/// Returns the table for `theme`, building it if absent or stale.
	///
	/// `None` and `Some("")` both select the module-only table.
	pub fn get_shape_table(&self, theme: Option<&str>) -> Result<Arc<ShapeTable>, ShapeError> {
		let theme = Key::new(theme.unwrap_or_default());
		self.cache.get_or_build(&theme, || self.build(&theme))
	}

	/// Drops the cached table for `theme`. Returns whether one was cached.
	pub fn invalidate(&self, theme: Option<&str>) -> bool {
		self.cache.invalidate(&Key::new(theme.unwrap_or_default()))
	}

	/// Drops every cached table.
	pub fn clear(&self) {
		self.cache.clear();
	}

	pub fn cache(&self) -> &ShapeTableCache {
		&self.cache
	}

	pub fn config(&self) -> &ShapeTableConfig {
		&self.config
	}

	fn build(&self, theme: &Key) -> Result<BuiltTable, ShapeError> {
		let graph = self.graphs.graph();
		tracing::info!(
			theme = %theme,
			providers = self.providers.len(),
			graph_revision = graph.revision(),
			"shape_table.build.start"
		);

		let Discovery { alterations, mut tokens } = discover_all(&self.providers, &self.config)?;
		let discovered = alterations.len();
		let applicable = alterations.into_iter().filter(|alteration| is_applicable(&graph, alteration, theme)).collect();
		let ordered = order_alterations(&graph, applicable).inspect_err(|error| {
			tracing::warn!(theme = %theme, %error, "shape_table.build.order_failed");
		})?;
		let table = ShapeTable::merge(&ordered);

		notify_created(&self.handlers, theme.as_str(), &table);

		for monitor in &self.monitors {
			let registered = catch_unwind(AssertUnwindSafe(|| monitor.monitor(&mut |token| tokens.push(token))));
			if registered.is_err() {
				tracing::warn!(theme = %theme, "shape_table.monitor.panicked");
			}
		}
		tokens.push(Arc::new(GraphRevisionToken {
			graphs: Arc::clone(&self.graphs),
			revision: graph.revision(),
		}));

		tracing::info!(
			theme = %theme,
			discovered,
			applied = ordered.len(),
			shape_types = table.len(),
			tokens = tokens.len(),
			"shape_table.build.done"
		);
		Ok(BuiltTable { table, tokens })
	}
}

/// Stale once the graph provider publishes a newer revision.
struct GraphRevisionToken {
	graphs: Arc<dyn ExtensionGraphProvider>,
	revision: u64,
}

impl VolatileToken for GraphRevisionToken {
	fn is_current(&self) -> bool {
		self.graphs.revision() == self.revision
	}
}

/// Assembles a [`ShapeTableManager`] from explicit collaborator lists.
///
/// Providers, handlers and monitors run in the order they are added.
pub struct ShapeTableManagerBuilder {
	graphs: Arc<dyn ExtensionGraphProvider>,
	providers: Vec<Arc<dyn ShapeTableProvider>>,
	handlers: Vec<Arc<dyn ShapeTableEventHandler>>,
	monitors: Vec<Arc<dyn ShapeTableMonitor>>,
	config: ShapeTableConfig,
}

impl ShapeTableManagerBuilder {
	pub fn provider(mut self, provider: Arc<dyn ShapeTableProvider>) -> Self {
		self.providers.push(provider);
		self
	}

	pub fn event_handler(mut self, handler: Arc<dyn ShapeTableEventHandler>) -> Self {
		self.handlers.push(handler);
		self
	}

	pub fn monitor(mut self, monitor: Arc<dyn ShapeTableMonitor>) -> Self {
		self.monitors.push(monitor);
		self
	}

	pub fn config(mut self, config: ShapeTableConfig) -> Self {
		self.config = config;
		self
	}

	pub fn build(self) -> Result<ShapeTableManager, ConfigError> {
		self.config.validate()?;
		tracing::debug!(
			providers = self.providers.len(),
			handlers = self.handlers.len(),
			monitors = self.monitors.len(),
			parallel_discovery = self.config.parallel_discovery,
			"shape_table_manager.build"
		);
		Ok(ShapeTableManager {
			graphs: self.graphs,
			providers: self.providers,
			handlers: self.handlers,
			monitors: self.monitors,
			config: self.config,
			cache: ShapeTableCache::new(),
		})
	}
}
