//! Command handlers for the kdlc CLI.
//!
//! Handlers print their results and exit with status 1 on failure. The
//! fallible cores (`compile`, `check`) are public for tests and library
//! consumers.

mod build;
mod check;
mod debug;
mod dump;

pub use build::{build_files, compile};
pub use check::{check, check_files, CheckOutcome};
pub use debug::{lex_file, list_types};
pub use dump::{dump_files, load_files};

use crate::BuildOptions;

/// Exit with a usage error when no input files were given.
pub(crate) fn require_inputs(options: &BuildOptions, command: &str) {
    if options.inputs.is_empty() {
        eprintln!("error: no input files");
        eprintln!("Usage: kdlc {command} <file.kdl>... [options]");
        std::process::exit(1);
    }
}
