use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_integer_arithmetic() {
    let a = Value::Integer(7);
    let b = Value::Integer(2);
    assert_eq!(Value::binary(LexemeKind::Plus, &a, &b).unwrap(), Value::Integer(9));
    assert_eq!(Value::binary(LexemeKind::Minus, &a, &b).unwrap(), Value::Integer(5));
    assert_eq!(Value::binary(LexemeKind::Star, &a, &b).unwrap(), Value::Integer(14));
    assert_eq!(Value::binary(LexemeKind::Slash, &a, &b).unwrap(), Value::Integer(3));
    assert_eq!(Value::binary(LexemeKind::LeftShift, &a, &b).unwrap(), Value::Integer(28));
    assert_eq!(Value::binary(LexemeKind::RightShift, &a, &b).unwrap(), Value::Integer(1));
    assert_eq!(Value::binary(LexemeKind::Caret, &a, &b).unwrap(), Value::Integer(5));
    assert_eq!(Value::binary(LexemeKind::Pipe, &a, &b).unwrap(), Value::Integer(7));
    assert_eq!(Value::binary(LexemeKind::Amp, &a, &b).unwrap(), Value::Integer(2));
}

#[test]
fn test_string_concatenation() {
    let s = Value::String("Ship ".to_string());
    assert_eq!(
        Value::binary(LexemeKind::Plus, &s, &Value::Integer(3)).unwrap(),
        Value::String("Ship 3".to_string())
    );
    assert_eq!(
        Value::binary(LexemeKind::Plus, &Value::Bool(true), &s).unwrap(),
        Value::String("trueShip ".to_string())
    );
}

#[test]
fn test_booleans_participate_as_integers() {
    assert_eq!(
        Value::binary(LexemeKind::Plus, &Value::Integer(1), &Value::Bool(true)).unwrap(),
        Value::Integer(2)
    );
    assert_eq!(
        Value::binary(LexemeKind::Amp, &Value::Bool(true), &Value::Bool(false)).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_percentages_stay_percentages() {
    assert_eq!(
        Value::binary(LexemeKind::Plus, &Value::Percentage(10), &Value::Percentage(5)).unwrap(),
        Value::Percentage(15)
    );
    assert_eq!(
        Value::binary(LexemeKind::Plus, &Value::Percentage(10), &Value::Integer(5)).unwrap(),
        Value::Integer(15)
    );
}

#[test]
fn test_incompatible_operands_have_a_message() {
    let err = Value::binary(
        LexemeKind::Minus,
        &Value::String("a".to_string()),
        &Value::Integer(1),
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2005);
    assert_eq!(err.message(), "Incompatible operands for `-`: string and integer");
}

#[test]
fn test_division_by_zero() {
    let err = Value::binary(LexemeKind::Slash, &Value::Integer(1), &Value::Integer(0)).unwrap_err();
    assert!(err.message().contains("Division by zero"));
}

#[test]
fn test_overflow_and_shift_range() {
    assert!(Value::binary(LexemeKind::Plus, &Value::Integer(i64::MAX), &Value::Integer(1)).is_err());
    assert!(Value::binary(LexemeKind::LeftShift, &Value::Integer(1), &Value::Integer(64)).is_err());
    assert!(Value::binary(LexemeKind::LeftShift, &Value::Integer(1), &Value::Integer(-1)).is_err());
}

#[test]
fn test_unary_operators() {
    assert_eq!(Value::Integer(0).not().unwrap(), Value::Integer(-1));
    assert_eq!(Value::Bool(false).not().unwrap(), Value::Bool(true));
    assert_eq!(Value::Integer(5).negate().unwrap(), Value::Integer(-5));
    assert!(Value::String(String::new()).negate().is_err());
}

#[test]
fn test_lexeme_conversion() {
    let reference = Lexeme::synthesized(LexemeKind::Reference, "Ship.128");
    let value = Value::from_lexeme(&reference).unwrap();
    assert_eq!(value.text(), "#Ship.128");

    let back = value.to_lexeme(&Location::synthesized()).unwrap();
    assert_eq!(back, reference);

    let truth = Value::from_lexeme(&Lexeme::synthesized(LexemeKind::Identifier, "true")).unwrap();
    assert_eq!(truth, Value::Bool(true));
    assert!(Value::Data(vec![1]).to_lexeme(&Location::synthesized()).is_err());
}
