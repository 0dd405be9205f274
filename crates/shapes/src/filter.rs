use vellum_extension_graph::{ExtensionGraph, ExtensionKind, Key, is_base_theme};

use crate::alteration::ShapeAlteration;

/// Returns true if `alteration` belongs in the table built for `theme`.
///
/// Module alterations always apply. Theme alterations apply only when they
/// come from `theme` itself or one of its base themes. Alterations whose
/// feature is unset or unknown never apply.
pub fn is_applicable(graph: &ExtensionGraph, alteration: &ShapeAlteration, theme: &Key) -> bool {
	let Some(feature_id) = alteration.feature() else {
		tracing::debug!(shape_type = %alteration.shape_type(), "shape_filter.unattributed");
		return false;
	};
	let Some(feature) = graph.feature_by_key(feature_id) else {
		tracing::debug!(shape_type = %alteration.shape_type(), feature = %feature_id, "shape_filter.unknown_feature");
		return false;
	};

	match graph.kind_of(feature) {
		Some(ExtensionKind::Module) => true,
		Some(ExtensionKind::Theme) => feature.id.is_empty() || feature.id == *theme || is_base_theme(graph, &feature.id, theme),
		None => false,
	}
}
