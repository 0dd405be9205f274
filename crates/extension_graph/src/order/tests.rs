use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::graph::{ExtensionDescriptor, FeatureDescriptor};
use crate::key::Key;

fn ids(order: &FeatureOrder) -> Vec<&str> {
	order.features().iter().map(Key::as_str).collect()
}

fn keys(names: &[&str]) -> Vec<FeatureId> {
	names.iter().copied().map(Key::from).collect()
}

fn module(builder: &mut crate::ExtensionGraphBuilder, id: &str, deps: &[&str], priority: i32) {
	builder.extension(ExtensionDescriptor::module(id));
	builder.feature(FeatureDescriptor::new(id, id).depends_on(deps.iter().copied()).with_priority(priority));
}

#[test]
fn dependency_precedes_dependent() {
	let graph = ExtensionGraph::builder().module("Alpha", &["Beta"]).module("Beta", &[]).build().unwrap();

	let order = order_features(&graph, &keys(&["Alpha", "Beta"])).unwrap();
	assert_eq!(ids(&order), ["Beta", "Alpha"]);
}

#[test]
fn transitive_dependencies_pull_in_unrequested_features() {
	let graph = ExtensionGraph::builder()
		.module("A", &["b"])
		.module("B", &["C"])
		.module("C", &[])
		.module("Unrelated", &[])
		.build()
		.unwrap();

	let order = order_features(&graph, &keys(&["A", "C"])).unwrap();
	assert_eq!(ids(&order), ["C", "B", "A"]);
	assert_eq!(order.rank(&Key::new("unrelated")), None);
}

#[test]
fn lower_priority_goes_first_among_unrelated() {
	let mut builder = ExtensionGraph::builder();
	module(&mut builder, "Zero", &[], 0);
	module(&mut builder, "Minus", &[], -10);
	let graph = builder.build().unwrap();

	let order = order_features(&graph, &keys(&["Zero", "Minus"])).unwrap();
	assert_eq!(ids(&order), ["Minus", "Zero"]);
}

#[test]
fn equal_priority_keeps_discovery_order() {
	let graph = ExtensionGraph::builder()
		.module("Zeta", &[])
		.module("Alpha", &[])
		.module("Mu", &[])
		.build()
		.unwrap();

	let order = order_features(&graph, &keys(&["Zeta", "Alpha", "Mu", "alpha"])).unwrap();
	assert_eq!(ids(&order), ["Zeta", "Alpha", "Mu"]);
}

#[test]
fn dependency_outranks_priority() {
	let mut builder = ExtensionGraph::builder();
	module(&mut builder, "Early", &["Late"], -100);
	module(&mut builder, "Late", &[], 100);
	let graph = builder.build().unwrap();

	let order = order_features(&graph, &keys(&["Early"])).unwrap();
	assert_eq!(ids(&order), ["Late", "Early"]);
}

#[test]
fn themes_follow_modules() {
	let graph = ExtensionGraph::builder().theme("Theme", None).module("Module", &[]).build().unwrap();

	let theme = graph.feature("Theme").unwrap();
	let module = graph.feature("Module").unwrap();
	assert!(has_dependency(&graph, theme, module));
	assert!(!has_dependency(&graph, module, theme));

	let order = order_features(&graph, &keys(&["Theme", "Module"])).unwrap();
	assert_eq!(ids(&order), ["Module", "Theme"]);
}

#[test]
fn base_theme_precedes_child_regardless_of_priority() {
	let mut builder = ExtensionGraph::builder();
	builder.theme("Child", Some("Parent"));
	if let Some(child) = builder.last_feature_mut() {
		child.priority = -100;
	}
	builder.theme("Parent", None);
	let graph = builder.build().unwrap();

	let order = order_features(&graph, &keys(&["Child"])).unwrap();
	assert_eq!(ids(&order), ["Parent", "Child"]);
}

#[test]
fn cyclic_base_theme_links_add_no_edges() {
	let graph = ExtensionGraph::builder()
		.module("Core", &[])
		.theme("A", Some("B"))
		.theme("B", Some("A"))
		.theme("Loop", Some("loop"))
		.build()
		.unwrap();

	let a = graph.feature("A").unwrap();
	let b = graph.feature("B").unwrap();
	assert!(!has_dependency(&graph, a, b));
	assert!(has_dependency(&graph, a, graph.feature("Core").unwrap()));

	let order = order_features(&graph, &keys(&["A", "Core"])).unwrap();
	assert_eq!(ids(&order), ["Core", "A"]);

	let order = order_features(&graph, &keys(&["Loop", "B", "A"])).unwrap();
	assert_eq!(ids(&order), ["Loop", "B", "A"]);
}

#[test]
fn cycle_is_reported_with_members() {
	let graph = ExtensionGraph::builder()
		.module("A", &["B"])
		.module("B", &["A"])
		.module("Bystander", &[])
		.build()
		.unwrap();

	let err = order_features(&graph, &keys(&["Bystander", "A"])).unwrap_err();
	assert_eq!(
		err,
		OrderError::DependencyCycle {
			features: keys(&["A", "B"]),
		}
	);
	assert_eq!(err.to_string(), "dependency cycle between features: A -> B -> A");
}

#[test]
fn cycle_behind_a_dependent_is_still_found() {
	let graph = ExtensionGraph::builder()
		.module("Top", &["Loop1"])
		.module("Loop1", &["Loop2"])
		.module("Loop2", &["Loop1"])
		.build()
		.unwrap();

	let OrderError::DependencyCycle { features } = order_features(&graph, &keys(&["Top"])).unwrap_err();
	assert_eq!(features, keys(&["Loop1", "Loop2"]));
}

#[test]
fn self_dependency_is_a_cycle() {
	let graph = ExtensionGraph::builder().module("Narcissus", &["narcissus"]).build().unwrap();

	let OrderError::DependencyCycle { features } = order_features(&graph, &keys(&["Narcissus"])).unwrap_err();
	assert_eq!(features, keys(&["Narcissus"]));
}

#[test]
fn unknown_dependencies_and_roots_are_ignored() {
	let graph = ExtensionGraph::builder().module("Alpha", &["Missing"]).build().unwrap();

	let order = order_features(&graph, &keys(&["Ghost", "Alpha"])).unwrap();
	assert_eq!(ids(&order), ["Alpha"]);
}

#[test]
fn sort_by_rank_is_stable_within_a_feature() {
	let graph = ExtensionGraph::builder().module("Alpha", &["Beta"]).module("Beta", &[]).build().unwrap();
	let order = order_features(&graph, &keys(&["Alpha", "Beta"])).unwrap();

	let mut items = vec![
		(Some(Key::new("Alpha")), 1),
		(Some(Key::new("Beta")), 2),
		(None, 3),
		(Some(Key::new("Alpha")), 4),
		(Some(Key::new("Beta")), 5),
	];
	order.sort_by_rank(&mut items, |(feature, _)| feature.as_ref());

	let seq: Vec<i32> = items.iter().map(|(_, n)| *n).collect();
	assert_eq!(seq, [2, 5, 1, 4, 3]);
}

fn dag_strategy() -> impl Strategy<Value = Vec<(i32, Vec<usize>)>> {
	(1usize..24).prop_flat_map(|n| {
		(0..n)
			.map(|i| (-5i32..5, proptest::collection::vec(0..i.max(1), 0..=i.min(4))))
			.collect::<Vec<_>>()
	})
}

proptest! {
	#[test]
	fn prop_dependencies_precede_dependents(spec in dag_strategy()) {
		let mut builder = ExtensionGraph::builder();
		for (i, (priority, deps)) in spec.iter().enumerate() {
			let names: Vec<String> = deps.iter().filter(|&&d| d < i).map(|d| format!("f{d}")).collect();
			let names: Vec<&str> = names.iter().map(String::as_str).collect();
			module(&mut builder, &format!("f{i}"), &names, *priority);
		}
		let graph = builder.build().unwrap();
		let roots: Vec<FeatureId> = (0..spec.len()).rev().map(|i| Key::new(format!("f{i}"))).collect();

		let order = order_features(&graph, &roots).unwrap();
		prop_assert_eq!(order.len(), spec.len());
		for feature in graph.features() {
			let rank = order.rank(&feature.id).unwrap();
			for dep in &feature.dependencies {
				prop_assert!(order.rank(dep).unwrap() < rank, "{} must follow {}", feature.id, dep);
			}
		}

		let again = order_features(&graph, &roots).unwrap();
		prop_assert_eq!(order.features(), again.features());
	}
}
