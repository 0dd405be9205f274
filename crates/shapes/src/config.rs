//! Shape table manager configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Tuning knobs for table builds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapeTableConfig {
	/// Run provider discovery on scoped threads when more than one provider
	/// is registered.
	pub parallel_discovery: bool,
	/// Upper bound on providers discovering at once.
	pub max_parallel_providers: usize,
}

impl Default for ShapeTableConfig {
	fn default() -> Self {
		Self {
			parallel_discovery: true,
			max_parallel_providers: 8,
		}
	}
}

impl ShapeTableConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_parallel_providers == 0 {
			return Err(ConfigError::ZeroParallelism);
		}
		Ok(())
	}
}
