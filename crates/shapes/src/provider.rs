//! Alteration providers and the discovery fan-out.
//!
//! Providers are independent and only see their own builder, so they can
//! discover concurrently. Results are always concatenated in registration
//! order regardless of which thread finished first.

use std::any::type_name;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;

use vellum_extension_graph::FeatureId;

use crate::builder::{Discovery, ShapeTableBuilder};
use crate::config::ShapeTableConfig;
use crate::error::ShapeError;

/// Source of shape alterations.
pub trait ShapeTableProvider: Send + Sync {
	/// Name used in logs and errors.
	fn name(&self) -> &str {
		type_name::<Self>()
	}

	/// Feature credited with alterations that do not name one explicitly.
	fn feature(&self) -> Option<FeatureId> {
		None
	}

	fn discover(&self, builder: &mut ShapeTableBuilder) -> anyhow::Result<()>;
}

enum Pending<'scope> {
	Spawned(&'scope str, thread::ScopedJoinHandle<'scope, Result<Discovery, ShapeError>>),
	Done(Result<Discovery, ShapeError>),
}

/// Runs every provider and concatenates their discoveries.
///
/// The first failing provider, in registration order, fails the whole
/// discovery. Later batches are not started once a batch has failed.
pub(crate) fn discover_all(providers: &[Arc<dyn ShapeTableProvider>], config: &ShapeTableConfig) -> Result<Discovery, ShapeError> {
	let mut merged = Discovery::default();
	if !config.parallel_discovery || providers.len() < 2 {
		for provider in providers {
			append(&mut merged, discover_one(provider.as_ref())?);
		}
		return Ok(merged);
	}

	let batch = config.max_parallel_providers.max(1);
	for (index, chunk) in providers.chunks(batch).enumerate() {
		let results = thread::scope(|scope| {
			let pending: Vec<Pending<'_>> = chunk
				.iter()
				.enumerate()
				.map(|(offset, provider)| {
					let provider = provider.as_ref();
					let spawned = thread::Builder::new()
						.name(format!("vellum-shapes-discover-{}", index * batch + offset))
						.spawn_scoped(scope, move || discover_one(provider));
					match spawned {
						Ok(handle) => Pending::Spawned(provider.name(), handle),
						Err(error) => {
							tracing::warn!(provider = provider.name(), %error, "shape_provider.spawn_failed");
							Pending::Done(discover_one(provider))
						}
					}
				})
				.collect();

			pending
				.into_iter()
				.map(|pending| match pending {
					Pending::Spawned(name, handle) => handle.join().unwrap_or_else(|_| Err(ShapeError::ProviderPanicked { provider: name.to_owned() })),
					Pending::Done(result) => result,
				})
				.collect::<Vec<_>>()
		});

		for result in results {
			append(&mut merged, result?);
		}
	}

	Ok(merged)
}

fn discover_one(provider: &dyn ShapeTableProvider) -> Result<Discovery, ShapeError> {
	let name = provider.name();
	let mut builder = ShapeTableBuilder::new(provider.feature());
	match catch_unwind(AssertUnwindSafe(|| provider.discover(&mut builder))) {
		Ok(Ok(())) => {
			tracing::debug!(provider = name, alterations = builder.len(), "shape_provider.discover");
			Ok(builder.finish())
		}
		Ok(Err(error)) => {
			let message = format!("{error:#}");
			tracing::warn!(provider = name, error = %message, "shape_provider.failed");
			Err(ShapeError::Provider {
				provider: name.to_owned(),
				message,
			})
		}
		Err(_) => {
			tracing::warn!(provider = name, "shape_provider.panicked");
			Err(ShapeError::ProviderPanicked { provider: name.to_owned() })
		}
	}
}

fn append(merged: &mut Discovery, discovery: Discovery) {
	merged.alterations.extend(discovery.alterations);
	merged.tokens.extend(discovery.tokens);
}
