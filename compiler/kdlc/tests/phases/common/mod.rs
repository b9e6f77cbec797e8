//! Shared fixtures for driver tests.

use std::path::{Path, PathBuf};

use kdlc::BuildOptions;

/// A two-field type used by most fixtures.
pub const WIDGET: &str = r#"
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

/// Write `source` to `dir/name` and return the path.
pub fn write_source(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}

pub fn options(inputs: Vec<PathBuf>) -> BuildOptions {
    BuildOptions {
        inputs,
        ..BuildOptions::default()
    }
}
