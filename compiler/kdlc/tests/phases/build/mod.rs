//! `build`: one session across all inputs, written in the selected format.

use kdl_diagnostic::ErrorCode;
use kdl_rsrc::{codec, Attributes, Format};
use kdlc::commands::{compile, load_files};
use pretty_assertions::assert_eq;

use crate::common::{options, write_source, WIDGET};

#[test]
fn later_files_see_earlier_types() {
    let dir = tempfile::tempdir().unwrap();
    let types = write_source(dir.path(), "types.kdl", WIDGET);
    let data = write_source(
        dir.path(),
        "data.kdl",
        r#"declare Widget { new (#128, "First") { Value = 7; }; new { }; };"#,
    );

    let session = compile(&options(vec![types, data])).unwrap();
    let ids: Vec<i64> = session.instances().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![128, 129]);
}

#[test]
fn written_file_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        dir.path(),
        "widgets.kdl",
        &format!("{WIDGET}\ndeclare Widget {{ new (#200, \"Big\") {{ Value = 1000; }}; }};"),
    );
    let output = dir.path().join("out.kdat");
    let mut build = options(vec![source]);
    build.output = Some(output.clone());

    let session = compile(&build).unwrap();
    session.write(&build.output_path()).unwrap();

    let (format, file) = codec::read_file(&output).unwrap();
    assert_eq!(format, Format::Extended);
    let code = session.types().get("Widget").unwrap().code();
    let resource = file.get(code, 200, &Attributes::new()).unwrap();
    assert_eq!(resource.name, "Big");
    assert_eq!(resource.data, vec![0x03, 0xE8, 4, b'n', b'o', b'n', b'e']);

    let manager = load_files(&[output]).unwrap();
    assert_eq!(manager.get_type(code, &Attributes::new()).len(), 1);
}

#[test]
fn format_name_drives_conditions() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        dir.path(),
        "widgets.kdl",
        &format!(
            "{WIDGET}\ndeclare Widget {{ @condition(classic) new (#128) {{ }}; @notCondition(classic) new (#129) {{ }}; }};"
        ),
    );

    let mut build = options(vec![source]);
    build.format = Format::Classic;
    let session = compile(&build).unwrap();
    let ids: Vec<i64> = session.instances().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![128]);
    assert_eq!(session.format(), Format::Classic);
}

#[test]
fn defines_reach_sources() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        dir.path(),
        "widgets.kdl",
        &format!("{WIDGET}\n@condition(Debug) declare Widget {{ new {{ }}; }};"),
    );

    let plain = compile(&options(vec![source.clone()])).unwrap();
    assert!(plain.instances().is_empty());

    let mut debug = options(vec![source]);
    debug.definitions.push("Debug".to_string());
    assert_eq!(compile(&debug).unwrap().instances().len(), 1);
}

#[test]
fn later_files_shadow_earlier_in_dump() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_source(
        dir.path(),
        "first.kdl",
        &format!("{WIDGET}\ndeclare Widget {{ new (#128, \"Old\") {{ }}; new (#129) {{ }}; }};"),
    );
    let second = write_source(
        dir.path(),
        "second.kdl",
        &format!("{WIDGET}\ndeclare Widget {{ new (#128, \"New\") {{ }}; }};"),
    );

    let mut outputs = Vec::new();
    for (input, name) in [(first, "first.kdat"), (second, "second.kdat")] {
        let output = dir.path().join(name);
        compile(&options(vec![input])).unwrap().write(&output).unwrap();
        outputs.push(output);
    }

    let manager = load_files(&outputs).unwrap();
    let code = kdl_rsrc::TypeCode::new("wdgt").unwrap();
    let names: Vec<&str> = manager
        .get_type(code, &Attributes::new())
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["New", ""]);
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = compile(&options(vec![dir.path().join("absent.kdl")]))
        .err()
        .unwrap();
    assert_eq!(err.code(), ErrorCode::E9001);
    assert!(err.to_string().contains("absent.kdl"));
}
