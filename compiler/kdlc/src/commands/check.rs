//! The `check` command: compile each input on its own without writing.

use std::path::PathBuf;

use kdl_diagnostic::{CompileError, CompileResult, Diagnostic};
use kdl_sema::CompileSession;
use rayon::prelude::*;

use super::require_inputs;
use crate::{report_with_warnings, BuildOptions};

/// The result of checking one file.
#[derive(Debug)]
pub struct CheckOutcome {
    pub path: PathBuf,
    /// Number of resources the file declares, or the first error.
    pub result: CompileResult<usize>,
    /// Warnings of a file that compiled.
    pub warnings: Vec<Diagnostic>,
}

/// Check every input in its own session, in parallel.
///
/// Outcomes are returned in input order.
pub fn check(options: &BuildOptions) -> Vec<CheckOutcome> {
    options
        .inputs
        .par_iter()
        .map(|path| {
            let mut warnings = Vec::new();
            let result = CompileSession::new(options.session_config()).and_then(|mut session| {
                session.compile_file(path)?;
                let count = session.resource_file()?.len();
                warnings = session.warnings().to_vec();
                Ok(count)
            });
            CheckOutcome {
                path: path.clone(),
                result,
                warnings,
            }
        })
        .collect()
}

pub fn check_files(options: &BuildOptions) {
    require_inputs(options, "check");

    let mut warnings: Vec<Diagnostic> = Vec::new();
    let mut errors: Vec<CompileError> = Vec::new();
    for outcome in check(options) {
        warnings.extend(outcome.warnings);
        match outcome.result {
            Ok(count) => println!("OK: {} ({count} resources)", outcome.path.display()),
            Err(error) => errors.push(error),
        }
    }

    if !warnings.is_empty() || !errors.is_empty() {
        report_with_warnings(&warnings, &errors);
    }
    if !errors.is_empty() {
        std::process::exit(1);
    }
}
