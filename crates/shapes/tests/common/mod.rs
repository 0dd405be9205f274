#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vellum_extension_graph::{ExtensionGraph, ExtensionGraphProvider, FeatureId, Key};
use vellum_shapes::{BindingTarget, ShapeTableBuilder, ShapeTableProvider};

/// Installs a test-writer subscriber so build events show up on failure.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

pub fn shared(graph: ExtensionGraph) -> Arc<dyn ExtensionGraphProvider> {
	Arc::new(Arc::new(graph))
}

pub fn template(path: &str) -> BindingTarget {
	BindingTarget::Template { path: path.to_owned() }
}

/// Closure-backed provider that counts its discover calls.
pub struct FnProvider<F> {
	name: &'static str,
	feature: Option<&'static str>,
	calls: AtomicUsize,
	discover: F,
}

impl<F> FnProvider<F> {
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl<F> ShapeTableProvider for FnProvider<F>
where
	F: Fn(&mut ShapeTableBuilder) -> anyhow::Result<()> + Send + Sync,
{
	fn name(&self) -> &str {
		self.name
	}

	fn feature(&self) -> Option<FeatureId> {
		self.feature.map(Key::new)
	}

	fn discover(&self, builder: &mut ShapeTableBuilder) -> anyhow::Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		(self.discover)(builder)
	}
}

pub fn provider<F>(name: &'static str, feature: Option<&'static str>, discover: F) -> Arc<FnProvider<F>>
where
	F: Fn(&mut ShapeTableBuilder) -> anyhow::Result<()> + Send + Sync,
{
	Arc::new(FnProvider {
		name,
		feature,
		calls: AtomicUsize::new(0),
		discover,
	})
}

/// Provider binding `shape` to `source` on behalf of its own feature.
pub fn binds(feature: &'static str, shape: &'static str, source: &'static str) -> Arc<FnProvider<impl Fn(&mut ShapeTableBuilder) -> anyhow::Result<()> + Send + Sync>> {
	provider(feature, Some(feature), move |builder| {
		builder.describe(shape).bound_as(source, template(source));
		Ok(())
	})
}
