use pretty_assertions::assert_eq;

use kdl_lexer::{lex, LexerOptions};

use super::*;
use crate::{builtins, Function};

fn stream(source: &str) -> LexemeStream {
    LexemeStream::new(lex(source, "test.kdl", &LexerOptions::default()).unwrap())
}

fn eval_in(source: &str, scope: &mut Scope<'_>) -> CompileResult<Value> {
    let mut stream = stream(source);
    let expression = Expression::compile(&mut stream)?;
    expression.evaluate(scope)
}

fn eval(source: &str) -> Value {
    let mut scope = Scope::new();
    builtins::install(&mut scope).unwrap();
    eval_in(source, &mut scope).unwrap()
}

#[test]
fn test_single_literals() {
    assert_eq!(eval("42"), Value::Integer(42));
    assert_eq!(eval("0x10"), Value::Integer(16));
    assert_eq!(eval("50%"), Value::Percentage(50));
    assert_eq!(eval("\"text\""), Value::String("text".to_string()));
    assert_eq!(eval("true"), Value::Bool(true));
    assert_eq!(eval("Unbound"), Value::Identifier("Unbound".to_string()));
}

#[test]
fn test_precedence() {
    assert_eq!(eval("$(1 + 2 * 3)"), Value::Integer(7));
    assert_eq!(eval("$((1 + 2) * 3)"), Value::Integer(9));
    assert_eq!(eval("$(1 << 2 + 1)"), Value::Integer(5));
    assert_eq!(eval("$(6 | 1 & 3)"), Value::Integer(7));
}

#[test]
fn test_left_and_right_associativity() {
    assert_eq!(eval("$(10 - 3 - 2)"), Value::Integer(5));
    assert_eq!(eval("$(16 / 4 / 2)"), Value::Integer(2));
    assert_eq!(eval("$(1 ^ 3 ^ 7)"), Value::Integer(5));
}

#[test]
fn test_negative_literal_after_operand_subtracts() {
    assert_eq!(eval("$(5 -1)"), Value::Integer(4));
    assert_eq!(eval("$(-1 + 5)"), Value::Integer(4));
    assert_eq!(eval("$(2 * -3)"), Value::Integer(-6));
}

#[test]
fn test_unary_not() {
    assert_eq!(eval("$(~0 & 0xFF)"), Value::Integer(255));
    assert_eq!(eval("$(~false)"), Value::Bool(true));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("$(\"Shuttle \" + 2)"), Value::String("Shuttle 2".to_string()));
}

#[test]
fn test_variables_and_identifiers() {
    let mut scope = Scope::new();
    scope.add_variable("FieldNumber", Value::Integer(3));
    scope.add_constant("Large", Value::Integer(2));
    assert_eq!(eval_in("$($FieldNumber * 10)", &mut scope).unwrap(), Value::Integer(30));
    assert_eq!(eval_in("Large", &mut scope).unwrap(), Value::Integer(2));
    let err = eval_in("$missing", &mut scope).unwrap_err();
    assert_eq!(err.message(), "Unrecognised variable referenced: `missing`");
    assert_eq!(err.location().unwrap().line, 1);
}

#[test]
fn test_function_calls() {
    assert_eq!(eval("max(1, 5, 3)"), Value::Integer(5));
    assert_eq!(eval("$(min(4, 2) + abs(-3))"), Value::Integer(5));
    assert_eq!(eval("$(len(upper(\"ab\")) * 2)"), Value::Integer(4));
}

#[test]
fn test_nested_user_functions() {
    let mut root = Scope::new();
    builtins::install(&mut root).unwrap();
    let mut body_stream = stream("$($x * 2)");
    let body = Expression::compile(&mut body_stream).unwrap();
    root.add_function(
        "double",
        Function::User {
            params: vec!["x".to_string()],
            body,
        },
    )
    .unwrap();
    let mut child = root.shadow();
    assert_eq!(eval_in("$(double(double(3)) + 1)", &mut child).unwrap(), Value::Integer(13));
}

#[test]
fn test_assignment() {
    let mut scope = Scope::new();
    assert_eq!(eval_in("$(speed = 3 * 100)", &mut scope).unwrap(), Value::Integer(300));
    assert_eq!(scope.variable("speed").unwrap().value, Value::Integer(300));
    assert_eq!(eval_in("$(speed = 1)", &mut scope).unwrap(), Value::Integer(1));
    assert_eq!(scope.variable("speed").unwrap().value, Value::Integer(1));

    scope.add_constant("fixed", Value::Integer(0));
    assert!(eval_in("$(fixed = 1)", &mut scope).is_err());
}

#[test]
fn test_compile_consumes_only_the_expression() {
    let mut s = stream("$(1 + (2)) ; next");
    let expression = Expression::compile(&mut s).unwrap();
    assert_eq!(expression.lexemes().len(), 5);
    assert!(s.expect(LexemeKind::Semi));
}

#[test]
fn test_compile_errors() {
    let err = Expression::compile(&mut stream("$(1 + 2")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1003);

    let err = Expression::compile(&mut stream(";")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1002);

    let mut scope = Scope::new();
    let err = eval_in("$(1 +)", &mut scope).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1002);
    let err = eval_in("$(1 2)", &mut scope).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1001);
}

#[test]
fn test_display_round_trips_lexeme_text() {
    let mut s = stream("$(a + \"b\")");
    let expression = Expression::compile(&mut s).unwrap();
    assert_eq!(expression.to_string(), "a + \"b\"");
}
