//! Extension and feature graph.
//!
//! Modules and themes declare features; features declare dependencies and a
//! priority; themes may inherit from a base theme. This crate holds the
//! immutable snapshot of that graph and the algorithms that read it:
//!
//! - [`order`] - dependency-first, priority-second total ordering of features
//! - [`themes`] - bounded base-theme chain walks
//! - [`catalog`] - atomically swappable current graph
//!
//! All ids are [`Key`]s and compare case-insensitively.

pub mod catalog;
pub mod error;
pub mod graph;
pub mod key;
pub mod order;
pub mod themes;

pub use catalog::{ExtensionCatalog, ExtensionGraphProvider};
pub use error::{GraphError, OrderError, ThemeChainError};
pub use graph::{ExtensionDescriptor, ExtensionGraph, ExtensionGraphBuilder, ExtensionKind, FeatureDescriptor};
pub use key::{ExtensionId, FeatureId, Key};
pub use order::{FeatureOrder, has_dependency, order_features};
pub use themes::{base_theme_chain, is_base_theme};
