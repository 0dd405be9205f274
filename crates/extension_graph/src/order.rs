//! Dependency and priority ordering of features.
//!
//! # Mental Model
//!
//! The orderer works on the *considered set*: the requested root features plus
//! everything they transitively depend on. Edges come from three places:
//!
//! 1. Explicit `dependencies` on the feature descriptor.
//! 2. A theme depends on its extension's base theme, unless its base-theme
//!    chain is cyclic.
//! 3. A theme implicitly depends on every module in the considered set, so
//!    theme contributions always land after module contributions.
//!
//! The output is a Kahn topological order where, among features whose
//! dependencies are all placed, the lowest `(priority, discovery ordinal)`
//! goes next. Equal priorities therefore keep discovery order.
//!
//! # Invariants
//!
//! - A feature never precedes anything it depends on, directly or transitively.
//!   - Enforced in: [`order_features`].
//!   - Tested by: `order::tests::prop_dependencies_precede_dependents`
//! - Cycles surface as [`OrderError::DependencyCycle`] naming the members.
//!   - Enforced in: [`find_cycle`].
//!   - Tested by: `order::tests::cycle_is_reported_with_members`

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::OrderError;
use crate::graph::{ExtensionGraph, ExtensionKind, FeatureDescriptor};
use crate::key::FeatureId;
use crate::themes::base_theme_chain;

/// Returns the base theme `feature` is ordered after.
///
/// A base-theme link on a cyclic chain is malformed and contributes no edge,
/// so it cannot turn into a dependency cycle.
fn ordering_base_theme<'g>(graph: &'g ExtensionGraph, feature: &FeatureDescriptor) -> Option<&'g FeatureId> {
	let base = graph.base_theme_of(feature)?;
	if let Err(err) = base_theme_chain(graph, &feature.id) {
		tracing::debug!(feature = %feature.id, error = %err, "feature_order.base_theme_cycle");
		return None;
	}
	Some(base)
}

/// Returns true if `item` must be applied after `subject`.
pub fn has_dependency(graph: &ExtensionGraph, item: &FeatureDescriptor, subject: &FeatureDescriptor) -> bool {
	if graph.kind_of(item) == Some(ExtensionKind::Theme) {
		match graph.kind_of(subject) {
			Some(ExtensionKind::Module) => return true,
			Some(ExtensionKind::Theme) if ordering_base_theme(graph, item) == Some(&subject.id) => return true,
			_ => {}
		}
	}
	item.lists_dependency(&subject.id)
}

/// A computed total order over a set of features.
#[derive(Debug, Clone, Default)]
pub struct FeatureOrder {
	order: Vec<FeatureId>,
	ranks: FxHashMap<FeatureId, usize>,
}

impl FeatureOrder {
	/// Position of `feature` in the order, if it was considered.
	pub fn rank(&self, feature: &FeatureId) -> Option<usize> {
		self.ranks.get(feature).copied()
	}

	/// Features in applied order.
	pub fn features(&self) -> &[FeatureId] {
		&self.order
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Stable-sorts `items` by the rank of the feature each one belongs to.
	///
	/// Items whose feature is unknown to this order sort last, keeping their
	/// relative order.
	pub fn sort_by_rank<T, F>(&self, items: &mut [T], feature_of: F)
	where
		F: Fn(&T) -> Option<&FeatureId>,
	{
		items.sort_by_key(|item| feature_of(item).and_then(|f| self.rank(f)).unwrap_or(usize::MAX));
	}
}

/// Orders `roots` and their transitive dependencies.
///
/// Root ids not present in the graph are skipped. Duplicate roots are
/// collapsed onto their first occurrence.
pub fn order_features<'a, I>(graph: &ExtensionGraph, roots: I) -> Result<FeatureOrder, OrderError>
where
	I: IntoIterator<Item = &'a FeatureId>,
{
	let nodes = collect_considered(graph, roots);
	let deps = collect_edges(graph, &nodes);

	let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
	let mut pending: Vec<usize> = vec![0; nodes.len()];
	for (node, node_deps) in deps.iter().enumerate() {
		pending[node] = node_deps.len();
		for &dep in node_deps {
			dependents[dep].push(node);
		}
	}

	let mut ready: BinaryHeap<Reverse<(i32, usize)>> = nodes
		.iter()
		.enumerate()
		.filter(|(idx, _)| pending[*idx] == 0)
		.map(|(idx, feature)| Reverse((feature.priority, idx)))
		.collect();

	let mut order = Vec::with_capacity(nodes.len());
	while let Some(Reverse((_, idx))) = ready.pop() {
		order.push(idx);
		for &next in &dependents[idx] {
			pending[next] -= 1;
			if pending[next] == 0 {
				ready.push(Reverse((nodes[next].priority, next)));
			}
		}
	}

	if order.len() < nodes.len() {
		let cycle = find_cycle(&deps, &pending);
		let features: Vec<FeatureId> = cycle.into_iter().map(|idx| nodes[idx].id.clone()).collect();
		tracing::debug!(features = ?features, "feature_order.cycle");
		return Err(OrderError::DependencyCycle { features });
	}

	let order: Vec<FeatureId> = order.into_iter().map(|idx| nodes[idx].id.clone()).collect();
	let ranks = order.iter().enumerate().map(|(rank, id)| (id.clone(), rank)).collect();
	Ok(FeatureOrder { order, ranks })
}

/// Discovers the considered set in deterministic order: roots first as given,
/// then dependencies as they are first reached.
fn collect_considered<'g, 'a, I>(graph: &'g ExtensionGraph, roots: I) -> Vec<&'g FeatureDescriptor>
where
	I: IntoIterator<Item = &'a FeatureId>,
{
	let mut seen: FxHashSet<&'g FeatureId> = FxHashSet::default();
	let mut nodes: Vec<&'g FeatureDescriptor> = Vec::new();

	for root in roots {
		let Some(feature) = graph.feature_by_key(root) else {
			tracing::debug!(feature = %root, "feature_order.unknown_root");
			continue;
		};
		if seen.insert(&feature.id) {
			nodes.push(feature);
		}
	}

	let mut cursor = 0;
	while cursor < nodes.len() {
		let feature = nodes[cursor];
		cursor += 1;
		let base = ordering_base_theme(graph, feature);
		for dep_id in feature.dependencies.iter().chain(base) {
			let Some(dep) = graph.feature_by_key(dep_id) else {
				tracing::debug!(feature = %feature.id, dependency = %dep_id, "feature_order.unknown_dependency");
				continue;
			};
			if seen.insert(&dep.id) {
				nodes.push(dep);
			}
		}
	}

	nodes
}

/// Builds per-node dependency lists (indices into `nodes`).
fn collect_edges(graph: &ExtensionGraph, nodes: &[&FeatureDescriptor]) -> Vec<Vec<usize>> {
	let index: FxHashMap<&FeatureId, usize> = nodes.iter().enumerate().map(|(idx, f)| (&f.id, idx)).collect();
	let modules: Vec<usize> = nodes
		.iter()
		.enumerate()
		.filter(|(_, f)| graph.kind_of(f) == Some(ExtensionKind::Module))
		.map(|(idx, _)| idx)
		.collect();

	nodes
		.iter()
		.map(|feature| {
			let mut deps: Vec<usize> = feature.dependencies.iter().filter_map(|dep| index.get(dep).copied()).collect();
			if graph.kind_of(feature) == Some(ExtensionKind::Theme) {
				if let Some(base) = ordering_base_theme(graph, feature)
					&& let Some(&idx) = index.get(base)
					&& graph.kind_of(nodes[idx]) == Some(ExtensionKind::Theme)
				{
					deps.push(idx);
				}
				deps.extend(modules.iter().copied());
			}
			deps.sort_unstable();
			deps.dedup();
			deps
		})
		.collect()
}

/// Extracts one concrete cycle from the nodes Kahn's algorithm could not place.
///
/// Every unplaced node has at least one unplaced dependency, so following
/// unplaced dependencies from any unplaced node must revisit a node.
fn find_cycle(deps: &[Vec<usize>], pending: &[usize]) -> Vec<usize> {
	let unplaced = |idx: usize| pending[idx] > 0;
	let Some(start) = (0..deps.len()).find(|&idx| unplaced(idx)) else {
		return Vec::new();
	};

	let mut path: Vec<usize> = Vec::new();
	let mut position: FxHashMap<usize, usize> = FxHashMap::default();
	let mut current = start;
	loop {
		if let Some(&pos) = position.get(&current) {
			return path.split_off(pos);
		}
		position.insert(current, path.len());
		path.push(current);
		match deps[current].iter().copied().find(|&dep| unplaced(dep)) {
			Some(next) => current = next,
			None => return path,
		}
	}
}

#[cfg(test)]
mod tests;
