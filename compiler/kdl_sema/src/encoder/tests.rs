use kdl_rsrc::TypeCode;
use kdl_types::BinaryTemplate;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn here() -> Location {
    Location::synthesized()
}

fn define(types: &mut TypeTable, name: &str, code: &str, fields: Vec<BinaryField>) {
    let mut template = BinaryTemplate::new();
    for field in fields {
        template.add_field(field).unwrap();
    }
    let mut definition = TypeDefinition::new(name, TypeCode::new(code).unwrap(), &here());
    definition.set_template(template);
    types.register(definition).unwrap();
}

fn types() -> TypeTable {
    let mut types = TypeTable::new();
    define(
        &mut types,
        "Rect",
        "RECT",
        ["Top", "Left", "Bottom", "Right"]
            .into_iter()
            .map(|label| BinaryField::new(label, DataType::Dwrd))
            .collect(),
    );
    define(
        &mut types,
        "Window",
        "WIND",
        vec![
            BinaryField::new("Title", DataType::Pstr),
            BinaryField::new("Frame", DataType::Rect).nesting("Rect"),
            BinaryField::new("Count", DataType::Ocnt),
            BinaryField::new("Items", DataType::Lstc),
            BinaryField::new("Item", DataType::Hbyt),
            BinaryField::new("Items", DataType::Lste),
        ],
    );
    define(
        &mut types,
        "Link",
        "LINK",
        vec![
            BinaryField::new("Label", DataType::Cnnn(4)),
            BinaryField::new("Target", DataType::Rsrc),
            BinaryField::new("Tail", DataType::Cstr),
        ],
    );
    types
}

fn instance(types: &TypeTable, name: &str) -> ResourceInstance {
    ResourceInstance::new(types.get(name).unwrap(), None, 128, "", &here(), types).unwrap()
}

#[test]
fn test_encode_empty_window() {
    let types = types();
    let window = instance(&types, "Window");
    let bytes = Encoder::new(&types, Format::Extended).encode(&window).unwrap();
    // empty PSTR, four zero words, zero count
    assert_eq!(bytes, vec![0; 1 + 8 + 2]);
}

#[test]
fn test_encode_window() {
    let types = types();
    let definition = types.get("Window").unwrap();
    let mut window = instance(&types, "Window");
    window.fields.assign("Title", Value::String("Hi".into()), &here()).unwrap();
    window.fields.assign("Frame.Bottom", Value::Integer(480), &here()).unwrap();
    window.fields.assign("Frame.Right", Value::Integer(-1), &here()).unwrap();

    let region = definition.template().list_region("Count").unwrap();
    for item in [7, 9] {
        let mut entry = FieldSet::entry(definition, &region, &types).unwrap();
        entry.assign("Item", Value::Integer(item), &here()).unwrap();
        window.fields.list_mut("Count", &here()).unwrap().push(entry);
    }

    let bytes = Encoder::new(&types, Format::Extended).encode(&window).unwrap();
    assert_eq!(
        bytes,
        vec![2, b'H', b'i', 0, 0, 0, 0, 0x01, 0xE0, 0xFF, 0xFF, 0, 2, 7, 9]
    );
}

#[test]
fn test_integer_overflow() {
    let types = types();
    let definition = types.get("Window").unwrap();
    let mut window = instance(&types, "Window");
    let region = definition.template().list_region("Count").unwrap();
    let mut entry = FieldSet::entry(definition, &region, &types).unwrap();
    entry.assign("Item", Value::Integer(256), &here()).unwrap();
    window.fields.list_mut("Count", &here()).unwrap().push(entry);

    let err = Encoder::new(&types, Format::Extended).encode(&window).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2005);
    assert_eq!(err.message(), "Value 256 does not fit in field 'Item' (HBYT)");
}

#[test]
fn test_fixed_width_string_and_reference() {
    let types = types();
    let mut link = instance(&types, "Link");
    link.fields.assign("Label", Value::String("Kestrel".into()), &here()).unwrap();
    let target = ResourceReference::parse("Window.200").unwrap();
    link.fields.assign("Target", Value::Reference(target), &here()).unwrap();
    link.fields.assign("Tail", Value::String("é".into()), &here()).unwrap();

    let bytes = Encoder::new(&types, Format::Extended).encode(&link).unwrap();
    let mut expected = vec![b'K', b'e', b's', 0];
    expected.push(ReferenceFlags::TYPE.bits());
    expected.extend_from_slice(b"WIND");
    expected.extend_from_slice(&200i64.to_be_bytes());
    expected.extend_from_slice(&[0x8E, 0]);
    assert_eq!(bytes, expected);
}

#[test]
fn test_classic_reference() {
    let types = types();
    let mut link = instance(&types, "Link");
    link.fields
        .assign("Target", Value::Reference(ResourceReference::with_id(300)), &here())
        .unwrap();
    let bytes = Encoder::new(&types, Format::Classic).encode(&link).unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 0, 0x01, 0x2C, 0]);

    link.fields
        .assign("Target", Value::Reference(ResourceReference::with_id(40_000)), &here())
        .unwrap();
    let err = Encoder::new(&types, Format::Classic).encode(&link).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3003);
}

#[test]
fn test_missing_reference_is_zeroed() {
    let types = types();
    let link = instance(&types, "Link");
    let bytes = Encoder::new(&types, Format::Rez).encode(&link).unwrap();
    assert_eq!(bytes, vec![0; 4 + 9 + 1]);
}

proptest! {
    #[test]
    fn rect_words_are_big_endian(top in any::<i16>(), right in any::<i16>()) {
        let types = types();
        let mut rect = instance(&types, "Rect");
        rect.fields.assign("Top", Value::Integer(i64::from(top)), &here()).unwrap();
        rect.fields.assign("Right", Value::Integer(i64::from(right)), &here()).unwrap();
        let bytes = Encoder::new(&types, Format::Classic).encode(&rect).unwrap();
        let mut expected = top.to_be_bytes().to_vec();
        expected.extend([0, 0, 0, 0]);
        expected.extend(right.to_be_bytes());
        prop_assert_eq!(bytes, expected);
    }

    #[test]
    fn words_outside_i16_are_rejected(value in prop_oneof![i64::MIN..-32768_i64, 32768_i64..i64::MAX]) {
        let types = types();
        let mut rect = instance(&types, "Rect");
        rect.fields.assign("Left", Value::Integer(value), &here()).unwrap();
        let err = Encoder::new(&types, Format::Extended).encode(&rect).err().unwrap();
        prop_assert_eq!(err.code(), ErrorCode::E2005);
    }
}
