use std::fmt;
use std::sync::Arc;

use vellum_extension_graph::{ExtensionGraph, FeatureId, Key, OrderError, order_features};

use crate::descriptor::ShapeDescriptor;

/// One in-place edit of a descriptor.
pub type Mutation = Arc<dyn Fn(&mut ShapeDescriptor) + Send + Sync>;

/// A feature's contribution to one shape type.
#[derive(Clone)]
pub struct ShapeAlteration {
	shape_type: Key,
	feature: Option<FeatureId>,
	mutations: Arc<[Mutation]>,
}

impl ShapeAlteration {
	pub fn new(shape_type: impl Into<Key>, feature: Option<FeatureId>, mutations: Vec<Mutation>) -> Self {
		Self {
			shape_type: shape_type.into(),
			feature,
			mutations: mutations.into(),
		}
	}

	pub fn shape_type(&self) -> &Key {
		&self.shape_type
	}

	pub fn feature(&self) -> Option<&FeatureId> {
		self.feature.as_ref()
	}

	/// Applies every mutation to `descriptor`, in declaration order.
	pub fn alter(&self, descriptor: &mut ShapeDescriptor) {
		for mutation in self.mutations.iter() {
			mutation(descriptor);
		}
	}
}

impl fmt::Debug for ShapeAlteration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShapeAlteration")
			.field("shape_type", &self.shape_type)
			.field("feature", &self.feature)
			.field("mutations", &self.mutations.len())
			.finish()
	}
}

/// Sorts alterations so that dependencies apply before dependents and, among
/// unrelated features, lower priorities apply first.
///
/// Alterations of the same feature keep their discovery order.
pub fn order_alterations(graph: &ExtensionGraph, mut alterations: Vec<ShapeAlteration>) -> Result<Vec<ShapeAlteration>, OrderError> {
	let order = order_features(graph, alterations.iter().filter_map(ShapeAlteration::feature))?;
	order.sort_by_rank(&mut alterations, ShapeAlteration::feature);
	Ok(alterations)
}
