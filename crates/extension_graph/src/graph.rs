//! Immutable snapshot of available extensions and their features.
//!
//! # Invariants
//!
//! - Feature ids are unique case-insensitively within one graph.
//!   - Enforced in: [`ExtensionGraphBuilder::build`].
//!   - Tested by: `graph::tests::duplicate_feature_ids_are_rejected`
//! - Every feature belongs to a declared extension.
//!   - Enforced in: [`ExtensionGraphBuilder::build`].
//!   - Tested by: `graph::tests::unknown_extension_is_rejected`

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::key::{ExtensionId, FeatureId, Key};

/// Whether an extension is a behavior module or a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
	Module,
	Theme,
}

impl ExtensionKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Module => "module",
			Self::Theme => "theme",
		}
	}
}

impl std::fmt::Display for ExtensionKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A module or theme as declared by its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
	pub id: ExtensionId,
	#[serde(default)]
	pub name: String,
	pub kind: ExtensionKind,
	#[serde(default)]
	pub location: String,
	/// Parent theme feature. Only meaningful for themes.
	#[serde(default)]
	pub base_theme: Option<FeatureId>,
}

impl ExtensionDescriptor {
	pub fn module(id: impl Into<ExtensionId>) -> Self {
		Self::new(id.into(), ExtensionKind::Module)
	}

	pub fn theme(id: impl Into<ExtensionId>) -> Self {
		Self::new(id.into(), ExtensionKind::Theme)
	}

	fn new(id: ExtensionId, kind: ExtensionKind) -> Self {
		let location = match kind {
			ExtensionKind::Module => "~/Modules",
			ExtensionKind::Theme => "~/Themes",
		};
		Self {
			name: id.as_str().to_owned(),
			id,
			kind,
			location: location.to_owned(),
			base_theme: None,
		}
	}

	pub fn with_base_theme(mut self, base: impl Into<FeatureId>) -> Self {
		self.base_theme = Some(base.into());
		self
	}

	pub fn with_location(mut self, location: impl Into<String>) -> Self {
		self.location = location.into();
		self
	}

	pub fn is_theme(&self) -> bool {
		self.kind == ExtensionKind::Theme
	}
}

/// A unit of functionality that can be enabled and contributes shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
	pub id: FeatureId,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub category: String,
	/// Features this one requires, in declaration order.
	#[serde(default)]
	pub dependencies: Vec<FeatureId>,
	/// Ordering hint among unrelated features; lower runs first.
	#[serde(default)]
	pub priority: i32,
	pub extension: ExtensionId,
}

impl FeatureDescriptor {
	pub fn new(id: impl Into<FeatureId>, extension: impl Into<ExtensionId>) -> Self {
		let id = id.into();
		Self {
			name: id.as_str().to_owned(),
			id,
			description: String::new(),
			category: String::new(),
			dependencies: Vec::new(),
			priority: 0,
			extension: extension.into(),
		}
	}

	pub fn depends_on<I, K>(mut self, dependencies: I) -> Self
	where
		I: IntoIterator<Item = K>,
		K: Into<FeatureId>,
	{
		self.dependencies.extend(dependencies.into_iter().map(Into::into));
		self
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	/// Returns true if `other` is listed as an explicit dependency.
	pub fn lists_dependency(&self, other: &FeatureId) -> bool {
		self.dependencies.iter().any(|dep| dep == other)
	}
}

/// Immutable extension/feature snapshot used for one table build.
#[derive(Debug, Clone, Default)]
pub struct ExtensionGraph {
	extensions: Vec<ExtensionDescriptor>,
	features: Vec<FeatureDescriptor>,
	extension_index: FxHashMap<ExtensionId, usize>,
	feature_index: FxHashMap<FeatureId, usize>,
	revision: u64,
}

impl ExtensionGraph {
	pub fn builder() -> ExtensionGraphBuilder {
		ExtensionGraphBuilder::default()
	}

	/// Publication revision assigned by [`crate::ExtensionCatalog`]; zero for
	/// graphs that were never published.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	pub(crate) fn set_revision(&mut self, revision: u64) {
		self.revision = revision;
	}

	pub fn feature(&self, id: &str) -> Option<&FeatureDescriptor> {
		self.feature_by_key(&Key::new(id))
	}

	pub fn feature_by_key(&self, id: &FeatureId) -> Option<&FeatureDescriptor> {
		self.feature_index.get(id).map(|&idx| &self.features[idx])
	}

	pub fn extension(&self, id: &str) -> Option<&ExtensionDescriptor> {
		self.extension_by_key(&Key::new(id))
	}

	pub fn extension_by_key(&self, id: &ExtensionId) -> Option<&ExtensionDescriptor> {
		self.extension_index.get(id).map(|&idx| &self.extensions[idx])
	}

	/// Returns the extension that owns `feature`.
	pub fn extension_of(&self, feature: &FeatureDescriptor) -> Option<&ExtensionDescriptor> {
		self.extension_by_key(&feature.extension)
	}

	pub fn kind_of(&self, feature: &FeatureDescriptor) -> Option<ExtensionKind> {
		self.extension_of(feature).map(|ext| ext.kind)
	}

	/// Returns the non-empty base theme declared for `feature`'s extension,
	/// if that extension is a theme.
	pub fn base_theme_of(&self, feature: &FeatureDescriptor) -> Option<&FeatureId> {
		let ext = self.extension_of(feature)?;
		if !ext.is_theme() {
			return None;
		}
		ext.base_theme.as_ref().filter(|base| !base.is_empty())
	}

	/// Features in declaration order.
	pub fn features(&self) -> &[FeatureDescriptor] {
		&self.features
	}

	/// Extensions in declaration order.
	pub fn extensions(&self) -> &[ExtensionDescriptor] {
		&self.extensions
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}
}

/// Collects descriptors and validates them into an [`ExtensionGraph`].
#[derive(Debug, Default)]
pub struct ExtensionGraphBuilder {
	extensions: Vec<ExtensionDescriptor>,
	features: Vec<FeatureDescriptor>,
}

impl ExtensionGraphBuilder {
	pub fn extension(&mut self, ext: ExtensionDescriptor) -> &mut Self {
		self.extensions.push(ext);
		self
	}

	pub fn feature(&mut self, feature: FeatureDescriptor) -> &mut Self {
		self.features.push(feature);
		self
	}

	/// Declares a module extension with its main feature of the same id.
	pub fn module(&mut self, id: &str, dependencies: &[&str]) -> &mut Self {
		self.extension(ExtensionDescriptor::module(id));
		self.feature(FeatureDescriptor::new(id, id).depends_on(dependencies.iter().copied()))
	}

	/// Declares a theme extension with its main feature of the same id.
	pub fn theme(&mut self, id: &str, base_theme: Option<&str>) -> &mut Self {
		let mut ext = ExtensionDescriptor::theme(id);
		ext.base_theme = base_theme.map(Key::from);
		self.extension(ext);
		self.feature(FeatureDescriptor::new(id, id))
	}

	/// Returns the most recently declared feature for further tweaking.
	pub fn last_feature_mut(&mut self) -> Option<&mut FeatureDescriptor> {
		self.features.last_mut()
	}

	/// Validates the declarations and moves them into a graph.
	///
	/// On error the builder keeps everything declared so far, so the caller
	/// can fix the offending entry and build again.
	pub fn build(&mut self) -> Result<ExtensionGraph, GraphError> {
		let mut extension_index =
			FxHashMap::with_capacity_and_hasher(self.extensions.len(), Default::default());
		for (idx, ext) in self.extensions.iter().enumerate() {
			if extension_index.insert(ext.id.clone(), idx).is_some() {
				return Err(GraphError::DuplicateExtension { id: ext.id.clone() });
			}
		}

		let mut feature_index =
			FxHashMap::with_capacity_and_hasher(self.features.len(), Default::default());
		for (idx, feature) in self.features.iter().enumerate() {
			if !extension_index.contains_key(&feature.extension) {
				return Err(GraphError::UnknownExtension {
					feature: feature.id.clone(),
					extension: feature.extension.clone(),
				});
			}
			if let Some(prev) = feature_index.insert(feature.id.clone(), idx) {
				return Err(GraphError::DuplicateFeature {
					id: feature.id.clone(),
					first: self.features[prev].extension.clone(),
					second: feature.extension.clone(),
				});
			}
		}

		let extensions = std::mem::take(&mut self.extensions);
		let features = std::mem::take(&mut self.features);
		Ok(ExtensionGraph {
			extensions,
			features,
			extension_index,
			feature_index,
			revision: 0,
		})
	}
}
