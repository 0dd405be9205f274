use pretty_assertions::assert_eq;
use vellum_extension_graph::Key;

use super::*;
use crate::builder::ShapeTableBuilder;
use crate::descriptor::BindingTarget;

fn template(path: &str) -> BindingTarget {
	BindingTarget::Template { path: path.to_owned() }
}

fn alterations(describe: impl FnOnce(&mut ShapeTableBuilder)) -> Vec<ShapeAlteration> {
	let mut builder = ShapeTableBuilder::new(None);
	describe(&mut builder);
	builder.build_alterations()
}

#[test]
fn lookups_ignore_case() {
	let table = ShapeTable::merge(&alterations(|b| {
		b.describe("AlphaShape").from_feature("Alpha").bound_as("Alpha.Binding", template("alpha"));
	}));

	assert!(table.descriptor("alphashape").is_some());
	assert!(table.descriptor("ALPHASHAPE").is_some());
	assert!(table.binding("alphaShape").is_some());
	assert_eq!(table.len(), 1);
}

#[test]
fn later_alterations_override_the_active_binding() {
	let table = ShapeTable::merge(&alterations(|b| {
		b.describe("Menu").from_feature("Base").bound_as("base", template("base"));
		b.describe("menu").from_feature("Override").bound_as("override", template("override"));
	}));

	let descriptor = table.descriptor("Menu").unwrap();
	assert_eq!(descriptor.binding_source(), Some("override"));
	assert_eq!(table.binding("menu").unwrap().binding_source, "override");
}

#[test]
fn provenance_reflects_each_alteration_alone() {
	let table = ShapeTable::merge(&alterations(|b| {
		b.describe("Menu").from_feature("Base").bound_as("base", template("base"));
		b.describe("Menu").from_feature("Wrapping").wrapper("Menu_Wrapper");
		b.describe("Menu").from_feature("Override").bound_as("override", template("override"));
	}));

	let descriptor = table.descriptor("Menu").unwrap();
	assert_eq!(
		descriptor.binding_sources(),
		&[
			BindingSource {
				feature: Some(Key::new("Base")),
				source: Some("base".to_owned()),
			},
			BindingSource {
				feature: Some(Key::new("Wrapping")),
				source: None,
			},
			BindingSource {
				feature: Some(Key::new("Override")),
				source: Some("override".to_owned()),
			},
		]
	);
	assert_eq!(descriptor.wrappers, vec!["Menu_Wrapper".to_owned()]);
}

#[test]
fn alternates_join_their_shape_type_group() {
	let table = ShapeTable::merge(&alterations(|b| {
		b.describe("Content").from_feature("Core").bound_as("content", template("content"));
		b.describe("Content__Summary").from_feature("Core").bound_as("summary", template("summary"));
	}));

	assert_eq!(table.len(), 1);
	let descriptor = table.descriptor("content").unwrap();
	assert_eq!(descriptor.bindings.len(), 2);
	assert_eq!(descriptor.binding_sources().len(), 2);
	assert_eq!(descriptor.binding_sources()[1].source, None);
	assert_eq!(table.binding("content__summary").unwrap().binding_source, "summary");
}

#[test]
fn colliding_binding_names_resolve_to_last_descriptor() {
	fn shared(shape_type: &'static str) -> impl Fn(&mut ShapeDescriptor) + Send + Sync + 'static {
		move |descriptor| {
			descriptor.bind(ShapeBinding {
				shape_type: Key::new(shape_type),
				binding_name: Key::new("Shared"),
				binding_source: shape_type.to_owned(),
				target: BindingTarget::Method { name: "render".to_owned() },
			})
		}
	}

	let table = ShapeTable::merge(&alterations(|b| {
		b.describe("First").configure(shared("First"));
		b.describe("Second").configure(shared("Second"));
	}));

	assert_eq!(table.binding("shared").unwrap().shape_type, Key::new("Second"));
	assert_eq!(table.bindings().len(), 1);
}

#[test]
fn descriptors_keep_first_appearance_order() {
	let table = ShapeTable::merge(&alterations(|b| {
		b.describe("Zeta");
		b.describe("Alpha");
		b.describe("zeta");
	}));

	let order: Vec<&str> = table.descriptors().keys().map(Key::as_str).collect();
	assert_eq!(order, vec!["Zeta", "Alpha"]);
	assert_eq!(table.descriptor("zeta").unwrap().binding_sources().len(), 2);
}

#[test]
fn empty_input_yields_empty_table() {
	let table = ShapeTable::merge(&[]);
	assert!(table.is_empty());
	assert!(table.bindings().is_empty());
}
