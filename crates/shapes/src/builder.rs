//! Collection of alterations during provider discovery.
//!
//! A provider receives a [`ShapeTableBuilder`] seeded with its default
//! feature and calls [`ShapeTableBuilder::describe`] once per binding it
//! contributes. Each call returns a chainable [`ShapeAlterationBuilder`].
//!
//! Binding names of the form `Shape__Alternate` describe the shape type
//! `Shape` while binding under the full name.

use std::fmt;
use std::sync::Arc;

use vellum_extension_graph::{FeatureId, Key};

use crate::alteration::{Mutation, ShapeAlteration};
use crate::descriptor::{BindingTarget, Placement, ShapeBinding, ShapeDescriptor};
use crate::volatile::VolatileToken;

const ALTERNATE_SEPARATOR: &str = "__";

/// Alterations and volatility tokens gathered from one provider.
#[derive(Default)]
pub(crate) struct Discovery {
	pub alterations: Vec<ShapeAlteration>,
	pub tokens: Vec<Arc<dyn VolatileToken>>,
}

impl fmt::Debug for Discovery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Discovery")
			.field("alterations", &self.alterations)
			.field("tokens", &self.tokens.len())
			.finish()
	}
}

struct PendingAlteration {
	shape_type: Key,
	binding_name: Key,
	feature: Option<FeatureId>,
	mutations: Vec<Mutation>,
}

/// Receives alterations from one provider.
pub struct ShapeTableBuilder {
	default_feature: Option<FeatureId>,
	pending: Vec<PendingAlteration>,
	tokens: Vec<Arc<dyn VolatileToken>>,
}

impl ShapeTableBuilder {
	pub fn new(default_feature: Option<FeatureId>) -> Self {
		Self {
			default_feature,
			pending: Vec::new(),
			tokens: Vec::new(),
		}
	}

	/// Starts describing the shape named by `binding_name`.
	pub fn describe(&mut self, binding_name: &str) -> ShapeAlterationBuilder<'_> {
		let shape_type = binding_name.split(ALTERNATE_SEPARATOR).next().unwrap_or(binding_name);
		self.pending.push(PendingAlteration {
			shape_type: Key::new(shape_type),
			binding_name: Key::new(binding_name),
			feature: self.default_feature.clone(),
			mutations: Vec::new(),
		});
		let last = self.pending.len() - 1;
		ShapeAlterationBuilder {
			pending: &mut self.pending[last],
		}
	}

	/// Registers a token whose staleness should invalidate the built table.
	pub fn monitor(&mut self, token: Arc<dyn VolatileToken>) {
		self.tokens.push(token);
	}

	/// Number of alterations described so far.
	pub fn len(&self) -> usize {
		self.pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	/// Finalizes the described alterations in `describe` order.
	pub fn build_alterations(self) -> Vec<ShapeAlteration> {
		self.finish().alterations
	}

	pub(crate) fn finish(self) -> Discovery {
		let alterations = self
			.pending
			.into_iter()
			.map(|p| ShapeAlteration::new(p.shape_type, p.feature, p.mutations))
			.collect();
		Discovery {
			alterations,
			tokens: self.tokens,
		}
	}
}

/// Chainable editor for one pending alteration.
pub struct ShapeAlterationBuilder<'a> {
	pending: &'a mut PendingAlteration,
}

impl ShapeAlterationBuilder<'_> {
	/// Attributes the alteration to `feature` instead of the provider default.
	pub fn from_feature(self, feature: impl Into<FeatureId>) -> Self {
		self.pending.feature = Some(feature.into());
		self
	}

	/// Binds the described name to `target`.
	pub fn bound_as(self, binding_source: impl Into<String>, target: BindingTarget) -> Self {
		let shape_type = self.pending.shape_type.clone();
		let binding_name = self.pending.binding_name.clone();
		let binding_source = binding_source.into();
		self.configure(move |descriptor| {
			descriptor.bind(ShapeBinding {
				shape_type: shape_type.clone(),
				binding_name: binding_name.clone(),
				binding_source: binding_source.clone(),
				target: target.clone(),
			});
		})
	}

	/// Appends an arbitrary edit.
	pub fn configure<F>(self, mutation: F) -> Self
	where
		F: Fn(&mut ShapeDescriptor) + Send + Sync + 'static,
	{
		self.pending.mutations.push(Arc::new(mutation));
		self
	}

	/// Appends a wrapper shape name.
	pub fn wrapper(self, wrapper: impl Into<String>) -> Self {
		let wrapper = wrapper.into();
		self.configure(move |descriptor| descriptor.wrappers.push(wrapper.clone()))
	}

	/// Sets the default placement.
	pub fn placement(self, zone: impl Into<String>, position: Option<&str>) -> Self {
		let placement = Placement {
			zone: zone.into(),
			position: position.map(str::to_owned),
		};
		self.configure(move |descriptor| descriptor.default_placement = Some(placement.clone()))
	}
}
