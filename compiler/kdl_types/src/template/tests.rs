use pretty_assertions::assert_eq;

use super::*;

fn template(fields: &[(&str, DataType)]) -> BinaryTemplate {
    let mut tmpl = BinaryTemplate::new();
    for (label, data_type) in fields {
        tmpl.add_field(BinaryField::new(*label, *data_type)).unwrap();
    }
    tmpl
}

fn strings() -> BinaryTemplate {
    template(&[
        ("Flags", DataType::Hwrd),
        ("Count", DataType::Ocnt),
        ("Entries", DataType::Lstc),
        ("Text", DataType::Pstr),
        ("Value", DataType::Dwrd),
        ("Entries", DataType::Lste),
        ("Trailer", DataType::Dlng),
    ])
}

#[test]
fn test_lookup() {
    let tmpl = strings();
    assert_eq!(tmpl.len(), 7);
    assert_eq!(tmpl.index("Text"), Some(3));
    assert_eq!(tmpl.get("Trailer").unwrap().data_type, DataType::Dlng);
    assert!(!tmpl.has_field("Missing"));
    let err = tmpl.named("Missing", &Location::synthesized()).unwrap_err();
    assert_eq!(err.message(), "Field name 'Missing' does not match any binary template fields.");
}

#[test]
fn test_duplicate_labels_are_rejected() {
    let mut tmpl = template(&[("A", DataType::Dwrd)]);
    let err = tmpl.add_field(BinaryField::new("A", DataType::Dbyt)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2006);
}

#[test]
fn test_list_region() {
    let tmpl = strings();
    tmpl.validate().unwrap();
    let region = tmpl.list_region("Count").unwrap();
    assert_eq!(region, ListRegion { count: 1, members: 3..5 });
    assert!(tmpl.list_region("Flags").is_none());
    assert_eq!(tmpl.enclosing_list(4), Some(region));
    assert_eq!(tmpl.enclosing_list(6), None);
}

#[test]
fn test_candidates() {
    let tmpl = template(&[
        ("Weapon1", DataType::Dwrd),
        ("Weapon2", DataType::Dwrd),
        ("Ammo1", DataType::Dwrd),
    ]);
    let labels: Vec<&str> = tmpl.candidates("Weapon").iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, vec!["Weapon1", "Weapon2"]);
}

#[test]
fn test_unbalanced_lists() {
    let unclosed = template(&[("Count", DataType::Ocnt), ("L", DataType::Lstc)]);
    assert!(unclosed.validate().unwrap_err().message().contains("never closed"));

    let uncounted = template(&[("L", DataType::Lstc), ("L", DataType::Lste)]);
    assert_eq!(uncounted.validate().unwrap_err().code(), ErrorCode::E2003);
}
