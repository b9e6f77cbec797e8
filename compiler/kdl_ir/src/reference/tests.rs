use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_parse_plain_id() {
    let reference = ResourceReference::parse("128").unwrap();
    assert_eq!(reference, ResourceReference::with_id(128));
}

#[test]
fn test_parse_qualified() {
    let reference = ResourceReference::parse("Nova.Ship.-1").unwrap();
    assert_eq!(
        reference,
        ResourceReference {
            namespace: Some("Nova".to_string()),
            type_name: Some("Ship".to_string()),
            id: Some(-1),
        }
    );
    assert_eq!(reference.to_string(), "#Nova.Ship.-1");
}

#[test]
fn test_parse_auto() {
    let reference = ResourceReference::parse("Ship.auto").unwrap();
    assert!(reference.is_auto());
    assert_eq!(reference.type_name.as_deref(), Some("Ship"));
    assert_eq!(reference.resolved(130).to_string(), "#Ship.130");
}

#[test]
fn test_parse_rejects_garbage() {
    assert!(ResourceReference::parse("a.b.c.1").is_none());
    assert!(ResourceReference::parse("Ship.twelve").is_none());
}
