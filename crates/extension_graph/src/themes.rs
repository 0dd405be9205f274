//! Base-theme inheritance walks.
//!
//! Themes form single-parent chains through their extension's `base_theme`.
//! Manifests are user-authored, so a chain may point at a missing feature or
//! loop back on itself; both are handled without unbounded walking.

use rustc_hash::FxHashSet;

use crate::error::ThemeChainError;
use crate::graph::ExtensionGraph;
use crate::key::{FeatureId, Key};

/// Returns the strict ancestors of `theme`, nearest first.
///
/// The walk ends at a theme without a base theme, or at a reference to a
/// feature that does not exist (the missing id is not included). An unknown
/// `theme` has no ancestors.
pub fn base_theme_chain(graph: &ExtensionGraph, theme: &Key) -> Result<Vec<FeatureId>, ThemeChainError> {
	let mut chain = Vec::new();
	let Some(mut current) = graph.feature_by_key(theme) else {
		return Ok(chain);
	};

	let mut visited: FxHashSet<&FeatureId> = FxHashSet::default();
	visited.insert(&current.id);

	while let Some(base) = graph.base_theme_of(current) {
		if !visited.insert(base) {
			chain.push(base.clone());
			return Err(ThemeChainError::Cycle {
				theme: current_theme_id(graph, theme),
				chain,
			});
		}
		let Some(next) = graph.feature_by_key(base) else {
			tracing::debug!(theme = %current.id, base_theme = %base, "theme_chain.broken_reference");
			return Ok(chain);
		};
		chain.push(next.id.clone());
		current = next;
	}

	Ok(chain)
}

fn current_theme_id(graph: &ExtensionGraph, theme: &Key) -> FeatureId {
	graph.feature_by_key(theme).map(|f| f.id.clone()).unwrap_or_else(|| theme.clone())
}

/// Returns true if `candidate` is a strict ancestor of `theme`.
///
/// Broken references end the walk with `false`. A cyclic chain is treated as
/// malformed as a whole and also yields `false`.
pub fn is_base_theme(graph: &ExtensionGraph, candidate: &FeatureId, theme: &Key) -> bool {
	match base_theme_chain(graph, theme) {
		Ok(chain) => chain.iter().any(|ancestor| ancestor == candidate),
		Err(err) => {
			tracing::warn!(theme = %theme, candidate = %candidate, error = %err, "theme_chain.cycle");
			false
		}
	}
}
