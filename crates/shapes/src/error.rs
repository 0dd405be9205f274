use thiserror::Error;
use vellum_extension_graph::OrderError;

/// Failure to build a shape table. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
	#[error(transparent)]
	Order(#[from] OrderError),
	#[error("shape table provider `{provider}` failed: {message}")]
	Provider { provider: String, message: String },
	#[error("shape table provider `{provider}` panicked")]
	ProviderPanicked { provider: String },
}

/// Invalid shape table configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to parse shape table config: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("max_parallel_providers must be at least 1")]
	ZeroParallelism,
}
