use crate::key::{ExtensionId, FeatureId};

/// Errors raised while assembling an [`crate::ExtensionGraph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
	/// Two extensions share an id.
	#[error("duplicate extension id: {id}")]
	DuplicateExtension { id: ExtensionId },
	/// Two features share an id (case-insensitively).
	#[error("duplicate feature id: {id} (declared by {first} and {second})")]
	DuplicateFeature {
		id: FeatureId,
		first: ExtensionId,
		second: ExtensionId,
	},
	/// A feature names an extension that was never declared.
	#[error("feature {feature} references unknown extension {extension}")]
	UnknownExtension {
		feature: FeatureId,
		extension: ExtensionId,
	},
}

/// Errors raised by the dependency orderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
	/// Feature dependencies form a cycle; `features` lists one concrete cycle
	/// in dependency-walk order.
	#[error("dependency cycle between features: {}", join_cycle(features))]
	DependencyCycle { features: Vec<FeatureId> },
}

/// Errors raised while walking a theme's base-theme chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeChainError {
	/// The `BaseTheme` links loop back onto a theme already visited.
	#[error("base theme cycle from {theme}: {}", join_cycle(chain))]
	Cycle { theme: FeatureId, chain: Vec<FeatureId> },
}

fn join_cycle(ids: &[FeatureId]) -> String {
	let mut out = String::new();
	for id in ids {
		out.push_str(id.as_str());
		out.push_str(" -> ");
	}
	match ids.first() {
		Some(first) => out.push_str(first.as_str()),
		None => out.push_str("<empty>"),
	}
	out
}
