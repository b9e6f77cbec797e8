//! `check`: every input compiled in its own session.

use kdl_diagnostic::ErrorCode;
use kdlc::commands::check;
use pretty_assertions::assert_eq;

use crate::common::{options, write_source, WIDGET};

#[test]
fn outcomes_follow_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_source(
        dir.path(),
        "good.kdl",
        &format!("{WIDGET}\ndeclare Widget {{ new {{ }}; new {{ }}; }};"),
    );
    let bad = write_source(dir.path(), "bad.kdl", "declare Widget { new { }; };");
    let empty = write_source(dir.path(), "empty.kdl", "");

    let outcomes = check(&options(vec![good.clone(), bad.clone(), empty.clone()]));
    let paths: Vec<_> = outcomes.iter().map(|o| o.path.clone()).collect();
    assert_eq!(paths, vec![good, bad, empty]);

    assert_eq!(*outcomes[0].result.as_ref().unwrap(), 2);
    assert_eq!(outcomes[1].result.as_ref().err().unwrap().code(), ErrorCode::E2001);
    assert_eq!(*outcomes[2].result.as_ref().unwrap(), 0);
}

#[test]
fn sessions_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let types = write_source(dir.path(), "types.kdl", WIDGET);
    let uses = write_source(dir.path(), "uses.kdl", "declare Widget { new { }; };");

    let outcomes = check(&options(vec![types, uses]));
    assert!(outcomes[0].result.is_ok());
    assert!(outcomes[1].result.is_err());
}

#[test]
fn warnings_travel_with_the_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let source = r#"
        type Legacy : "lgcy" {
            template { DWRD Old; };
            @deprecated field("Old") { Old = 0; };
        };
        declare Legacy { new { Old = 1; }; };
    "#;
    let legacy = write_source(dir.path(), "legacy.kdl", source);

    let outcomes = check(&options(vec![legacy]));
    assert_eq!(*outcomes[0].result.as_ref().unwrap(), 1);
    let codes: Vec<_> = outcomes[0].warnings.iter().map(|w| w.code).collect();
    assert_eq!(codes, vec![ErrorCode::W2001]);
}
