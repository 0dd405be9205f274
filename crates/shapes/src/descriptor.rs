//! Per-shape-type aggregates produced by folding alterations.

use indexmap::IndexMap;
use serde::Serialize;
use vellum_extension_graph::{FeatureId, Key};

/// What the rendering pipeline should invoke for a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingTarget {
	/// A template harvested from an extension's views.
	Template { path: String },
	/// A code-defined shape method.
	Method { name: String },
}

/// A named way to render a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeBinding {
	pub shape_type: Key,
	pub binding_name: Key,
	/// Human-readable provenance, e.g. the template path or method path.
	pub binding_source: String,
	pub target: BindingTarget,
}

/// Provenance of one contributing alteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingSource {
	pub feature: Option<FeatureId>,
	/// Source of the binding this alteration placed under the shape type's own
	/// name, if it placed one.
	pub source: Option<String>,
}

/// Default zone and position for a shape when no placement rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
	pub zone: String,
	pub position: Option<String>,
}

/// Everything known about one shape type after merging.
///
/// Mutations see `&mut ShapeDescriptor` and may rewrite bindings, wrappers and
/// placement. Provenance is maintained by the merger only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeDescriptor {
	shape_type: Key,
	/// Bindings by name (case-insensitive), in insertion order.
	pub bindings: IndexMap<Key, ShapeBinding>,
	pub wrappers: Vec<String>,
	pub default_placement: Option<Placement>,
	binding_sources: Vec<BindingSource>,
}

impl ShapeDescriptor {
	pub fn new(shape_type: impl Into<Key>) -> Self {
		Self {
			shape_type: shape_type.into(),
			bindings: IndexMap::new(),
			wrappers: Vec::new(),
			default_placement: None,
			binding_sources: Vec::new(),
		}
	}

	pub fn shape_type(&self) -> &Key {
		&self.shape_type
	}

	/// Inserts or replaces a binding under its name.
	pub fn bind(&mut self, binding: ShapeBinding) {
		self.bindings.insert(binding.binding_name.clone(), binding);
	}

	pub fn binding(&self, name: &str) -> Option<&ShapeBinding> {
		self.bindings.get(&Key::new(name))
	}

	/// Source of the binding named after the shape type itself.
	pub fn binding_source(&self) -> Option<&str> {
		self.bindings.get(&self.shape_type).map(|b| b.binding_source.as_str())
	}

	/// Provenance records in applied order, one per contributing alteration.
	pub fn binding_sources(&self) -> &[BindingSource] {
		&self.binding_sources
	}

	pub(crate) fn push_binding_source(&mut self, source: BindingSource) {
		self.binding_sources.push(source);
	}
}
