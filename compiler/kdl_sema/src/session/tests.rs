use kdl_diagnostic::ErrorCode;
use kdl_rsrc::codec;
use pretty_assertions::assert_eq;

use super::*;
use crate::Encoder;

const WIDGET: &str = r#"
type Widget : "wdgt" {
    template {
        DWRD Value;
        PSTR Label;
    };

    field("Value") {
        Value = 5;
    };

    field("Label") {
        Label = "none";
    };
};
"#;

fn session(config: SessionConfig, source: &str) -> CompileResult<CompileSession> {
    let mut session = CompileSession::new(config)?;
    session.compile_source(source, "test.kdl")?;
    Ok(session)
}

fn compile(source: &str) -> CompileSession {
    session(SessionConfig::default(), source).unwrap()
}

fn compile_err(source: &str) -> CompileError {
    session(SessionConfig::default(), source).err().unwrap()
}

fn encoded(session: &CompileSession, index: usize) -> Vec<u8> {
    Encoder::new(session.types(), session.format())
        .encode(&session.instances()[index])
        .unwrap()
}

fn with_widget(declarations: &str) -> String {
    format!("{WIDGET}\n{declarations}")
}

#[test]
fn test_metadata() {
    let session = compile(r#"@project "Demo"; @author "Someone"; @version 3;"#);
    let metadata = session.metadata();
    assert_eq!(metadata.project.as_deref(), Some("Demo"));
    assert_eq!(metadata.author.as_deref(), Some("Someone"));
    assert_eq!(metadata.version.as_deref(), Some("3"));
    assert_eq!(metadata.license, None);
}

#[test]
fn test_format_directives() {
    let session = compile("@format set classic; @format requires classic;");
    assert_eq!(session.format(), Format::Classic);

    let err = compile_err("@format requires rez;");
    assert_eq!(err.code(), ErrorCode::E3001);
    let err = compile_err("@format set floppy;");
    assert_eq!(err.code(), ErrorCode::E3002);
}

#[test]
fn test_variables_first_write_wins() {
    let session = compile("@var Width = 10; @var Width = 20; @const Height = $($Width * 2);");
    let scope = session.root_scope();
    assert_eq!(scope.get("Width").unwrap().value, Value::Integer(10));
    assert_eq!(scope.get("Height").unwrap().value, Value::Integer(20));
}

#[test]
fn test_user_function() {
    let session = compile("@function double(x) = $($x * 2); @var Result = double(21);");
    assert_eq!(session.root_scope().get("Result").unwrap().value, Value::Integer(42));
}

#[test]
fn test_defined() {
    let config = SessionConfig::default().define("Debug");
    let session = session(config, "@var A = defined(Debug); @var B = defined(Release);").unwrap();
    let scope = session.root_scope();
    assert_eq!(scope.get("A").unwrap().value, Value::Bool(true));
    assert_eq!(scope.get("B").unwrap().value, Value::Bool(false));
}

#[test]
fn test_decorated_directive() {
    let err = compile_err("@deprecated @var X = 1;");
    assert_eq!(err.code(), ErrorCode::E1001);
    assert!(err.message().starts_with("Decorators cannot be applied to a directive"));
}

#[test]
fn test_defaults_and_auto_ids() {
    let session = compile(&with_widget(
        r#"
        declare Widget {
            new (#128, "First") { };
            new ("Second") { Value = 7; };
            new { Label: "third"; };
        };
        "#,
    ));
    let instances = session.instances();
    assert_eq!(instances.len(), 3);
    assert_eq!((instances[0].id, instances[0].name.as_str()), (128, "First"));
    assert_eq!((instances[1].id, instances[1].name.as_str()), (129, "Second"));
    assert_eq!(instances[2].id, 130);

    assert_eq!(encoded(&session, 0), vec![0, 5, 4, b'n', b'o', b'n', b'e']);
    assert_eq!(encoded(&session, 1), vec![0, 7, 4, b'n', b'o', b'n', b'e']);
    assert_eq!(encoded(&session, 2), vec![0, 5, 5, b't', b'h', b'i', b'r', b'd']);
}

#[test]
fn test_override_and_duplicate() {
    let session = compile(&with_widget(
        r#"
        declare Widget {
            new (#128, "Original") { Value = 1; };
            new (#129) { };
            override (#128) { Label = "changed"; };
            duplicate (#128, #200, "Copy") { Value = 2; };
        };
        "#,
    ));
    let instances = session.instances();
    let ids: Vec<i64> = instances.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![128, 129, 200]);
    assert_eq!(instances[0].name, "Original");
    assert_eq!(encoded(&session, 0), vec![0, 1, 7, b'c', b'h', b'a', b'n', b'g', b'e', b'd']);
    assert_eq!(instances[2].name, "Copy");
    assert_eq!(encoded(&session, 2), vec![0, 2, 7, b'c', b'h', b'a', b'n', b'g', b'e', b'd']);
}

#[test]
fn test_existence_errors() {
    let err = compile_err(&with_widget("declare Widget { override (#300) { }; };"));
    assert_eq!(err.code(), ErrorCode::E2004);
    assert_eq!(err.message(), "Attempting to override resource that does not exist.");

    let err = compile_err(&with_widget("declare Widget { duplicate (#300, #301) { }; };"));
    assert_eq!(err.message(), "Attempting to duplicate resource that does not exist.");

    let err = compile_err(&with_widget("declare Widget { new (#128) { }; new (#128) { }; };"));
    assert_eq!(err.code(), ErrorCode::E2004);
    assert_eq!(err.message(), "Resource #128 of type Widget already exists.");
}

#[test]
fn test_namespaces_are_distinct() {
    let session = compile(&with_widget(
        "declare Widget { new (#128) { }; }; declare Mods.Widget { new (#128) { }; };",
    ));
    let instances = session.instances();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[1].namespace.as_deref(), Some("Mods"));
}

#[test]
fn test_conditions() {
    let source = with_widget(
        r"
        declare Widget {
            @condition(Debug) new (#128) { };
            @notCondition(Debug) new (#129) { };
        };
        @condition(Debug)
        declare Widget { new (#130) { }; };
        ",
    );
    let release = session(SessionConfig::default(), &source).unwrap();
    let ids: Vec<i64> = release.instances().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![129]);

    let debug = session(SessionConfig::default().define("Debug"), &source).unwrap();
    let ids: Vec<i64> = debug.instances().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![128, 130]);

    // excluded resources are skipped without evaluating their arguments
    let guarded = with_widget(
        "declare Widget { @condition(Debug) new ($DebugId, $(1 + $Offset)) { Nope = $Missing; }; };",
    );
    let release = session(SessionConfig::default(), &guarded).unwrap();
    assert!(release.instances().is_empty());
}

#[test]
fn test_field_errors() {
    let err = compile_err(&with_widget("declare Widget { new { Nope = 1; }; };"));
    assert_eq!(err.code(), ErrorCode::E2001);

    let err = compile_err(&with_widget("declare Widget { new { Value = 1 2; }; };"));
    assert_eq!(err.code(), ErrorCode::E2005);

    let err = compile_err(&with_widget(r#"declare Widget { new { Value = "text"; }; };"#));
    assert_eq!(err.code(), ErrorCode::E2002);

    let err = compile_err("declare Missing { new { }; };");
    assert_eq!(err.code(), ErrorCode::E2001);
}

#[test]
fn test_literal_repeatable() {
    let session = compile(
        r"
        type Table : 'tabl' {
            template {
                DWRD Value1;
                DWRD Value2;
                DWRD Value3;
            };

            field('Value') repeatable<1, 3> {
                Value<$FieldNumber> = $($FieldNumber * 10);
            };
        };

        declare Table {
            new (#128) { Value = 99; };
        };
        ",
    );
    assert_eq!(encoded(&session, 0), vec![0, 99, 0, 20, 0, 30]);

    let err = session_err_repeat();
    assert_eq!(err.code(), ErrorCode::E2003);
}

fn session_err_repeat() -> CompileError {
    compile_err(
        r"
        type Pair : 'pair' {
            template { DWRD Value1; DWRD Value2; };
            field('Value') repeatable<1, 2> { Value<$FieldNumber> = 0; };
        };
        declare Pair { new { Value = 1; Value = 2; Value = 3; }; };
        ",
    )
}

#[test]
fn test_counted_list() {
    let session = compile(
        r#"
        @import Macintosh;
        declare StringList {
            new (#128) {
                String = "Hello";
                String = "World";
            };
        };
        "#,
    );
    let mut expected = vec![0, 2, 5];
    expected.extend_from_slice(b"Hello");
    expected.push(5);
    expected.extend_from_slice(b"World");
    assert_eq!(encoded(&session, 0), expected);
}

#[test]
fn test_nested_constructor_and_symbols() {
    let session = compile(
        r#"
        @import Kestrel;
        declare SceneInterface {
            new (#128, "Main") {
                Name = "Main";
                Frame = Rect(0, 0, 480, 640);
                Flags = $(Visible | Modal);
                Element = "OK" Button Rect(10, 10, 30, 90);
            };
        };
        "#,
    );
    let mut expected = b"Main\0".to_vec();
    expected.extend_from_slice(&[0, 0, 0, 0, 0x01, 0xE0, 0x02, 0x80]);
    expected.extend_from_slice(&[0, 3]);
    expected.extend_from_slice(&[0, 1]);
    expected.extend_from_slice(b"OK\0");
    expected.extend_from_slice(&[0, 1]);
    expected.extend_from_slice(&[0, 10, 0, 10, 0, 30, 0, 90]);
    expected.push(0);
    assert_eq!(encoded(&session, 0), expected);
}

#[test]
fn test_import_once() {
    let session = compile("@import Macintosh; @import module Macintosh;");
    assert!(session.types().get("StringList").is_some());

    let err = compile_err("@import Nowhere;");
    assert_eq!(err.code(), ErrorCode::E2001);
    assert_eq!(err.message(), "Unrecognised module `Nowhere`");
}

#[test]
fn test_encode_container() {
    let session = compile(&with_widget("declare Widget { new (#128, \"A\") { }; new (#129) { }; };"));
    let bytes = session.encode().unwrap();
    let (format, file) = codec::read(&bytes).unwrap();
    assert_eq!(format, Format::Extended);
    assert_eq!(file.len(), 2);
    let code = session.types().get("Widget").unwrap().code();
    let resource = file.get(code, 128, &kdl_rsrc::Attributes::new()).unwrap();
    assert_eq!(resource.name, "A");
    assert_eq!(resource.data, vec![0, 5, 4, b'n', b'o', b'n', b'e']);
}

#[test]
fn test_joined_values() {
    let toggle = r#"
        type Toggle : "tgle" {
            template {
                HWRD Flags;
                HWRD Extra;
            };

            field("Flags") {
                Flags as Bitmask = 7 [A = 1] | Extra [Special = 9];
            };
        };
    "#;
    let session = compile(&format!(
        "{toggle}\ndeclare Toggle {{ new {{ }}; new {{ Flags = Special; }}; new {{ Flags = 3; }}; }};"
    ));
    // defaults land in the last joined value's binary field
    assert_eq!(encoded(&session, 0), vec![0, 0, 0, 7]);
    // a joined value's symbol selects that value's binary field
    assert_eq!(encoded(&session, 1), vec![0, 0, 0, 9]);
    assert_eq!(encoded(&session, 2), vec![0, 3, 0, 7]);
}

#[test]
fn test_container_errors_point_at_the_declaration() {
    let source = with_widget("@format set classic;\ndeclare Widget { new (#40000) { }; };");
    let session = compile(&source);
    let err = session.encode().unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3003);
    let declared = source.lines().position(|l| l.contains("#40000")).unwrap() + 1;
    let location = err.location().unwrap();
    assert_eq!(&*location.file, "test.kdl");
    assert_eq!(location.line as usize, declared);

    let source = with_widget("declare Nova.Widget { new (#128) { }; };");
    let mut session = CompileSession::new(SessionConfig {
        format: Format::Rez,
        ..SessionConfig::default()
    })
    .unwrap();
    session.compile_source(&source, "test.kdl").unwrap();
    let err = session.resource_file().unwrap_err();
    assert!(err.message().contains("namespace=\"Nova\""));
    assert!(err.location().is_some());
}

#[test]
fn test_deprecated_field_warns() {
    let source = r#"
        type Legacy : "lgcy" {
            template {
                DWRD Value;
                DWRD Old;
            };

            field("Value") {
                Value = 0;
            };

            @deprecated field("Old") {
                Old = 0;
            };
        };

        declare Legacy {
            new { Value = 1; };
            new { Old = 2; };
        };
    "#;
    let session = compile(source);
    assert_eq!(session.instances().len(), 2);
    assert_eq!(encoded(&session, 1), vec![0, 0, 0, 2]);

    let [warning] = session.warnings() else {
        panic!("expected one warning, got {:?}", session.warnings());
    };
    assert_eq!(warning.code, ErrorCode::W2001);
    assert!(!warning.is_error());
    assert_eq!(warning.message, "Field 'Old' of type Legacy is deprecated");
    let line = source.lines().position(|l| l.contains("Old = 2")).unwrap() + 1;
    assert_eq!(warning.primary_location().unwrap().line as usize, line);
}
