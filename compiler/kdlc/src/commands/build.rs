//! The `build` command: compile every input into one resource file.

use kdl_diagnostic::CompileResult;
use kdl_sema::CompileSession;

use super::require_inputs;
use crate::{report, report_with_warnings, BuildOptions};

/// Compile all inputs, in order, into a single session.
///
/// Declarations in later files see the types, variables and resources of
/// earlier ones.
pub fn compile(options: &BuildOptions) -> CompileResult<CompileSession> {
    let mut session = CompileSession::new(options.session_config())?;
    for input in &options.inputs {
        tracing::debug!(path = %input.display(), format = %options.format, "compiling input");
        session.compile_file(input)?;
    }
    Ok(session)
}

pub fn build_files(options: &BuildOptions) {
    require_inputs(options, "build");
    let output = options.output_path();

    let result = compile(options).and_then(|session| {
        session.write(&output)?;
        Ok((session.instances().len(), session.format(), session.warnings().to_vec()))
    });

    match result {
        Ok((count, format, warnings)) => {
            if !warnings.is_empty() {
                report_with_warnings(&warnings, &[]);
            }
            println!(
                "Wrote {count} resource{} to '{}' ({format})",
                if count == 1 { "" } else { "s" },
                output.display()
            );
        }
        Err(error) => {
            report(&[error]);
            std::process::exit(1);
        }
    }
}
