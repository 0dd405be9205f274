//! The published shape table and the merge that produces it.
//!
//! # Invariants
//!
//! - Descriptor and binding lookups are case-insensitive.
//!   - Enforced in: [`Key`] equality and hashing.
//!   - Tested by: `table::tests::lookups_ignore_case`
//! - Each descriptor's provenance lists one record per alteration of its
//!   shape type, in applied order, computed from that alteration alone.
//!   - Enforced in: [`ShapeTable::merge`]
//!   - Tested by: `table::tests::provenance_reflects_each_alteration_alone`
//! - The flattened binding map has one deterministic winner per name: the
//!   binding inserted last.
//!   - Enforced in: [`ShapeTable::merge`]
//!   - Tested by: `table::tests::colliding_binding_names_resolve_to_last_descriptor`

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use vellum_extension_graph::Key;

use crate::alteration::ShapeAlteration;
use crate::descriptor::{BindingSource, ShapeBinding, ShapeDescriptor};

/// Immutable lookup table handed to the rendering pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShapeTable {
	descriptors: IndexMap<Key, ShapeDescriptor>,
	bindings: IndexMap<Key, ShapeBinding>,
}

impl ShapeTable {
	/// Folds `alterations` (already ordered and filtered) into a table.
	///
	/// Alterations are grouped by shape type in order of first appearance.
	/// Each group is folded left to right into one descriptor, then every
	/// alteration is replayed on a fresh descriptor to record its own
	/// binding source.
	pub fn merge(alterations: &[ShapeAlteration]) -> Self {
		let mut groups: IndexMap<Key, Vec<&ShapeAlteration>> = IndexMap::new();
		for alteration in alterations {
			groups.entry(alteration.shape_type().clone()).or_default().push(alteration);
		}

		let mut descriptors = IndexMap::with_capacity(groups.len());
		for (shape_type, group) in groups {
			let mut descriptor = ShapeDescriptor::new(shape_type.clone());
			for alteration in &group {
				alteration.alter(&mut descriptor);
			}
			for alteration in &group {
				let mut local = ShapeDescriptor::new(shape_type.clone());
				alteration.alter(&mut local);
				descriptor.push_binding_source(BindingSource {
					feature: alteration.feature().cloned(),
					source: local.binding_source().map(str::to_owned),
				});
			}
			descriptors.insert(shape_type, descriptor);
		}

		let mut bindings: IndexMap<Key, ShapeBinding> = IndexMap::new();
		for descriptor in descriptors.values() {
			for (name, binding) in &descriptor.bindings {
				match bindings.entry(name.clone()) {
					Entry::Occupied(mut slot) => {
						tracing::debug!(
							binding = %name,
							previous = %slot.get().shape_type,
							winner = %binding.shape_type,
							"shape_table.binding_collision"
						);
						slot.insert(binding.clone());
					}
					Entry::Vacant(slot) => {
						slot.insert(binding.clone());
					}
				}
			}
		}

		Self { descriptors, bindings }
	}

	pub fn descriptor(&self, shape_type: &str) -> Option<&ShapeDescriptor> {
		self.descriptors.get(&Key::new(shape_type))
	}

	pub fn binding(&self, binding_name: &str) -> Option<&ShapeBinding> {
		self.bindings.get(&Key::new(binding_name))
	}

	/// Descriptors by shape type, in order of first applied alteration.
	pub fn descriptors(&self) -> &IndexMap<Key, ShapeDescriptor> {
		&self.descriptors
	}

	/// Every binding of every descriptor, flattened by name.
	pub fn bindings(&self) -> &IndexMap<Key, ShapeBinding> {
		&self.bindings
	}

	/// Number of shape types.
	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}
}

#[cfg(test)]
mod tests;
