use serde_json::json;

use super::{SchemaSet, TypeExpr};
use crate::marshal::{Category, DelegateRegistry, MarshalError, MarshalOptions, Resolver, Value, classify_structural};

const DOCUMENT: &str = r#"{
	"types": {
		"Level": { "kind": "enum", "values": { "LOW": 0, "HIGH": 1 } },
		"Node": {
			"kind": "record",
			"fields": {
				"name": "string",
				"level": { "type": "Level", "default": 0 },
				"children": { "type": "list<Node>", "default": [] },
				"tags": "set<string>"
			}
		}
	}
}"#;

#[test]
fn parses_nested_expressions() {
	let expr = TypeExpr::parse("map<string, tuple<int, list<Node>>>").expect("expression parses");
	assert_eq!(
		expr,
		TypeExpr::Map(
			Box::new(TypeExpr::Named("string".into())),
			Box::new(TypeExpr::Tuple(vec![
				TypeExpr::Named("int".into()),
				TypeExpr::List(Box::new(TypeExpr::Named("Node".into()))),
			])),
		)
	);
	assert_eq!(expr.references(), ["Node"]);
}

#[test]
fn rejects_malformed_expressions() {
	for text in ["", "list", "list<>", "map<string>", "list<int", "list<int>>", "set<int, int>", "<int>"] {
		assert!(matches!(TypeExpr::parse(text), Err(MarshalError::InvalidTypeExpr { .. })), "{text:?}");
	}
}

#[test]
fn loads_recursive_document() {
	let set: SchemaSet = DOCUMENT.parse().expect("document loads");
	assert_eq!(set.names().collect::<Vec<_>>(), ["Level", "Node"]);

	let node = set.descriptor("Node").expect("node defined");
	assert_eq!(classify_structural(&node).expect("classifies"), Category::Record);
	let schema = node.as_record().expect("record").schema().expect("schema derives");
	assert_eq!(schema.get("children").map(|field| field.ty.name()), Some("list<Node>"));

	let registry = DelegateRegistry::default();
	let options = MarshalOptions::default();
	let value = Resolver::new(&registry, &options)
		.resolve(&node, &json!({"name": "root", "tags": ["a"], "children": [{"name": "leaf", "tags": [], "level": 1}]}))
		.expect("tree resolves");
	assert!(matches!(value.field("level"), Some(Value::Enum(member)) if member.label.as_ref() == "LOW"));
	let leaf = &value.field("children").and_then(Value::as_slice).expect("children")[0];
	assert!(matches!(leaf.field("level"), Some(Value::Enum(member)) if member.label.as_ref() == "HIGH"));
	assert_eq!(leaf.field("children"), Some(&Value::Seq(Vec::new())));
}

#[test]
fn resolves_expressions_against_document() {
	let set: SchemaSet = DOCUMENT.parse().expect("document loads");
	let ty = set.resolve_expr("map<string, Level>").expect("expression resolves");
	assert_eq!(ty.name(), "map<string, Level>");
	assert!(set.resolve_expr("list<Missing>").is_err());
}

#[test]
fn unknown_reference_fails_on_load() {
	let text = r#"{"types": {"A": {"kind": "record", "fields": {"b": "list<B>"}}}}"#;
	let err = text.parse::<SchemaSet>().expect_err("B is undefined");
	assert!(matches!(err, MarshalError::SchemaDocument { ref reason } if reason.contains("unknown type B in A.b")));
}

#[test]
fn bad_default_fails_on_load() {
	let text = r#"{"types": {"A": {"kind": "record", "fields": {"n": {"type": "int", "default": "many"}}}}}"#;
	let err = text.parse::<SchemaSet>().expect_err("default is not an int");
	assert!(matches!(err, MarshalError::SchemaDocument { ref reason } if reason.starts_with("default for A.n")));
}

#[test]
fn self_referential_default_fails_on_load() {
	let text = r#"{"types": {"Node": {"kind": "record", "fields": {"next": {"type": "Node", "default": {}}}}}}"#;
	let err = text.parse::<SchemaSet>().expect_err("Node default needs Node");
	assert!(matches!(err, MarshalError::SchemaDocument { ref reason } if reason.contains("default values of Node form a cycle")));
}

#[test]
fn mutually_referential_defaults_fail_on_load() {
	let text = r#"{"types": {
		"A": {"kind": "record", "fields": {"b": {"type": "B", "default": {}}}},
		"B": {"kind": "record", "fields": {"a": {"type": "A", "default": {}}}}
	}}"#;
	let err = text.parse::<SchemaSet>().expect_err("A and B defaults need each other");
	assert!(matches!(err, MarshalError::SchemaDocument { ref reason } if reason.starts_with("default for A.b") && reason.contains("form a cycle")));
}

#[test]
fn descriptor_outliving_its_set_stops_deriving() {
	let node = {
		let set: SchemaSet = DOCUMENT.parse().expect("document loads");
		let node = set.descriptor("Node").expect("node defined");
		assert!(node.as_record().expect("record").schema().is_ok());
		node
	};
	let err = node.as_record().expect("record").schema().expect_err("set is gone");
	assert!(matches!(err, MarshalError::SchemaDocument { ref reason } if reason.contains("was dropped")));
}

#[test]
fn document_errors_are_classified() {
	assert!(matches!("{".parse::<SchemaSet>(), Err(MarshalError::Syntax(_))));
	assert!(matches!(r#"{"types": {"A": {"kind": "class"}}}"#.parse::<SchemaSet>(), Err(MarshalError::SchemaDocument { .. })));
	assert!(matches!(
		r#"{"types": {"int": {"kind": "enum", "values": {"X": 1}}}}"#.parse::<SchemaSet>(),
		Err(MarshalError::SchemaDocument { .. })
	));
}
