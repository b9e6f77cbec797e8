use kdl_eval::{Scope, Value};
use kdl_ir::{Lexeme, LexemeKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::{BinaryField, DataType};

fn here() -> Location {
    Location::synthesized()
}

fn string_list() -> TypeDefinition {
    let mut template = BinaryTemplate::new();
    for (label, data_type) in [
        ("Flags", DataType::Hwrd),
        ("Count", DataType::Ocnt),
        ("Strings", DataType::Lstc),
        ("Text", DataType::Pstr),
        ("Strings", DataType::Lste),
    ] {
        template.add_field(BinaryField::new(label, data_type)).unwrap();
    }
    let mut def = TypeDefinition::new("StringList", TypeCode::new("STR#").unwrap(), &here());
    def.set_template(template);
    def
}

#[test]
fn test_synthesized_fields_follow_the_template() {
    let mut def = string_list();
    def.synthesize_fields().unwrap();
    let names: Vec<&str> = def.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Flags", "Strings"]);

    let strings = def.field_named("Strings", &here()).unwrap();
    assert_eq!(strings.count_field(), Some("Count"));
    assert_eq!(strings.values.len(), 1);
    assert_eq!(strings.values[0].base_name, "Text");
    assert_eq!(strings.values[0].descriptor.name, "String");
}

#[test]
fn test_declared_fields_are_kept() {
    let mut def = string_list();
    def.add_field(TypeField::new("Options", &here())).unwrap();
    def.synthesize_fields().unwrap();
    assert_eq!(def.fields().len(), 1);

    let err = def.add_field(TypeField::new("Options", &here())).unwrap_err();
    assert_eq!(err.message(), "Field `Options` is already defined in type `StringList`");
}

#[test]
fn test_unknown_field() {
    let def = string_list();
    let err = def.field_named("Nope", &here()).unwrap_err();
    assert_eq!(err.message(), "The field 'Nope' could not be found in type 'StringList'.");
}

#[test]
fn test_constructor_function() {
    let mut def = string_list();
    assert!(def.constructor().is_none());
    let value = |text: &str| Expression::literal(Lexeme::synthesized(LexemeKind::Variable, text));
    def.add_constructor(Constructor {
        params: vec!["flags".to_string()],
        assignments: vec![("Flags".to_string(), value("flags"))],
        location: here(),
    });

    let mut scope = Scope::new();
    scope.add_function("StringList", def.constructor().unwrap().function()).unwrap();
    let result = scope.call("StringList", &[Value::Integer(7)]).unwrap();
    assert_eq!(result, Value::Compound(vec![("Flags".to_string(), Value::Integer(7))]));
    assert_eq!(scope.get("Flags").map(|v| v.value.clone()), Some(Value::Integer(7)));
}

#[test]
fn test_allocate_id_skips_taken_ids() {
    let mut def = string_list();
    assert_eq!(def.allocate_id(|_| false), FIRST_AUTO_ID);
    assert_eq!(def.allocate_id(|id| id == 129 || id == 130), 131);
    assert_eq!(def.allocate_id(|_| false), 132);
}

proptest! {
    #[test]
    fn auto_ids_increase(taken in proptest::collection::btree_set(128i64..200, 0..40), count in 1usize..30) {
        let mut def = string_list();
        let mut previous = FIRST_AUTO_ID - 1;
        for _ in 0..count {
            let id = def.allocate_id(|id| taken.contains(&id));
            prop_assert!(id > previous);
            prop_assert!(!taken.contains(&id));
            previous = id;
        }
    }
}
