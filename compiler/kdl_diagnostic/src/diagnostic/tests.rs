use std::sync::Arc;

use kdl_ir::Span;
use pretty_assertions::assert_eq;

use super::*;

fn location() -> Location {
    Location::new(Arc::from("types.kdl"), 3, 9, Span::new(20, 25))
}

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("Unrecognised type 'Ship'")
        .with_label(location(), "used here")
        .with_note("types must be defined or imported before use")
        .with_suggestion("add `@import Kestrel;`");

    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 1);
    assert_eq!(diag.primary_location(), Some(&location()));
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("Unexpected lexeme encountered")
        .with_label(location(), "expected `;`")
        .with_note("each item ends with a semicolon");

    assert_eq!(
        diag.to_string(),
        "error [E1001]: Unexpected lexeme encountered\n  --> types.kdl:3:9: expected `;`\n  = note: each item ends with a semicolon"
    );
}

#[test]
fn test_warning_display() {
    let diag = Diagnostic::warning(ErrorCode::W2001)
        .with_message("Field 'Flags' of type Toggle is deprecated")
        .with_label(location(), "deprecated field assigned here")
        .with_suggestion("remove the assignment");

    assert!(!diag.is_error());
    assert_eq!(
        diag.to_string(),
        "warning [W2001]: Field 'Flags' of type Toggle is deprecated\n  --> types.kdl:3:9: deprecated field assigned here\n  = help: remove the assignment"
    );
}
