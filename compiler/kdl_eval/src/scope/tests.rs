use std::cell::RefCell;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use kdl_ir::{Lexeme, LexemeKind};

use super::*;
use crate::Expression;

#[test]
fn test_variable_lookup_walks_parents() {
    let mut root = Scope::new();
    root.add_variable("speed", Value::Integer(300));
    let child = root.shadow();
    let grandchild = child.shadow();
    assert_eq!(grandchild.variable("speed").unwrap().value, Value::Integer(300));
}

#[test]
fn test_unrecognised_variable() {
    let scope = Scope::new();
    let err = scope.variable("missing").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
    assert_eq!(err.message(), "Unrecognised variable referenced: `missing`");
}

#[test]
fn test_add_variable_is_first_write_wins() {
    let mut scope = Scope::new();
    assert!(scope.add_variable("x", Value::Integer(1)));
    assert!(!scope.add_variable("x", Value::Integer(2)));
    assert_eq!(scope.variable("x").unwrap().value, Value::Integer(1));
    assert_eq!(scope.local_variables().len(), 1);
}

#[test]
fn test_child_shadows_parent() {
    let mut root = Scope::new();
    root.add_variable("x", Value::Integer(1));
    let mut child = root.shadow();
    assert!(child.add_variable("x", Value::Integer(2)));
    assert_eq!(child.variable("x").unwrap().value, Value::Integer(2));
    assert!(child.has_variable("x", false));
    drop(child);
    assert_eq!(root.variable("x").unwrap().value, Value::Integer(1));
}

#[test]
fn test_assign_respects_mutability() {
    let mut scope = Scope::new();
    scope.add_variable("var", Value::Integer(1));
    scope.add_constant("CONST", Value::Integer(1));
    assert_eq!(scope.assign("var", Value::Integer(5)), Ok(()));
    assert_eq!(scope.assign("CONST", Value::Integer(5)), Err(AssignError::Immutable));
    assert_eq!(scope.assign("nope", Value::Integer(5)), Err(AssignError::Undefined));
    assert_eq!(scope.variable("var").unwrap().value, Value::Integer(5));
}

#[test]
fn test_change_callback_sees_adds_and_assignments() {
    let seen = RefCell::new(Vec::new());
    {
        let mut scope = Scope::new();
        scope.on_change(|v| seen.borrow_mut().push((v.name.clone(), v.value.clone())));
        scope.add_variable("a", Value::Integer(1));
        scope.add_variable("a", Value::Integer(9));
        scope.assign("a", Value::Integer(2)).unwrap();
    }
    assert_eq!(
        seen.into_inner(),
        vec![
            ("a".to_string(), Value::Integer(1)),
            ("a".to_string(), Value::Integer(2)),
        ]
    );
}

#[test]
fn test_root_functions_visible_from_descendants() {
    let mut root = Scope::new();
    root.add_function("seven", Function::native(Some(0), |_| Ok(Value::Integer(7))))
        .unwrap();
    let child = root.shadow();
    let mut grandchild = child.shadow();
    assert_eq!(grandchild.call("seven", &[]).unwrap(), Value::Integer(7));
}

#[test]
fn test_unrecognised_function() {
    let mut scope = Scope::new();
    let err = scope.call("nope", &[]).unwrap_err();
    assert_eq!(err.message(), "Unrecognised function referenced: `nope`");
}

#[test]
fn test_duplicate_function_is_rejected() {
    let mut scope = Scope::new();
    let f = || Function::native(None, |_| Ok(Value::Bool(true)));
    scope.add_function("f", f()).unwrap();
    assert_eq!(scope.add_function("f", f()).unwrap_err().code(), ErrorCode::E2006);
}

#[test]
fn test_user_function_binds_parameters() {
    let body = Expression::from_lexemes(vec![
        Lexeme::synthesized(LexemeKind::Variable, "a"),
        Lexeme::synthesized(LexemeKind::Star, "*"),
        Lexeme::synthesized(LexemeKind::Variable, "b"),
    ]);
    let mut scope = Scope::new();
    scope
        .add_function(
            "mul",
            Function::User {
                params: vec!["a".to_string(), "b".to_string()],
                body,
            },
        )
        .unwrap();
    assert_eq!(
        scope.call("mul", &[Value::Integer(6), Value::Integer(7)]).unwrap(),
        Value::Integer(42)
    );
    assert!(!scope.has_variable("a", true));
}

#[test]
fn test_constructor_exports_into_caller() {
    let assignment = |field: &str, param: &str| {
        (
            field.to_string(),
            Expression::literal(Lexeme::synthesized(LexemeKind::Variable, param)),
        )
    };
    let mut root = Scope::new();
    root.add_function(
        "Point",
        Function::Constructor {
            params: vec!["x".to_string(), "y".to_string()],
            assignments: vec![assignment("X", "x"), assignment("Y", "y")],
        },
    )
    .unwrap();

    let exported = RefCell::new(Vec::new());
    let mut caller = root.shadow();
    caller.on_change(|v| exported.borrow_mut().push(v.name.clone()));
    let value = caller
        .call("Point", &[Value::Integer(3), Value::Integer(4)])
        .unwrap();
    assert_eq!(
        value,
        Value::Compound(vec![
            ("X".to_string(), Value::Integer(3)),
            ("Y".to_string(), Value::Integer(4)),
        ])
    );
    assert_eq!(caller.variable("Y").unwrap().value, Value::Integer(4));
    drop(caller);
    assert_eq!(exported.into_inner(), vec!["X".to_string(), "Y".to_string()]);
    assert!(!root.has_variable("X", false));
}

proptest! {
    #[test]
    fn child_variables_never_leak_to_parent(
        names in proptest::collection::hash_set("[a-z]{1,8}", 1..10),
        value in any::<i64>(),
    ) {
        let root = Scope::new();
        {
            let mut child = root.shadow();
            for name in &names {
                child.add_variable(name.as_str(), Value::Integer(value));
            }
            let grandchild = child.shadow();
            for name in &names {
                prop_assert!(grandchild.has_variable(name, true));
                prop_assert!(!grandchild.has_variable(name, false));
                prop_assert!(!root.has_variable(name, true));
            }
        }
        prop_assert!(root.local_variables().is_empty());
    }
}
