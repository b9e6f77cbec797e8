//! Command-line driver for the KDL resource compiler.
//!
//! The binary in `main.rs` only dispatches; option parsing and the command
//! handlers live here so integration tests can drive them directly.

pub mod commands;
mod options;

use std::io::IsTerminal;
use std::sync::Once;

use kdl_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use kdl_diagnostic::{CompileError, Diagnostic};

pub use options::{parse_build_options, BuildOptions, DEFAULT_OUTPUT};

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when `RUST_LOG` is set.
///
/// `KDL_LOG_TREE=1` renders spans as an indented tree instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("KDL_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Render errors on stderr, followed by a count.
pub fn report(errors: &[CompileError]) {
    report_with_warnings(&[], errors);
}

/// Render warnings, then errors, on stderr. A summary follows when there
/// is more than one diagnostic.
pub fn report_with_warnings(warnings: &[Diagnostic], errors: &[CompileError]) {
    let stderr = std::io::stderr();
    let is_tty = stderr.is_terminal();
    let mut emitter = TerminalEmitter::with_color_mode(stderr, ColorMode::Auto, is_tty);
    emitter.emit_all(warnings);
    for error in errors {
        emitter.emit(&error.to_diagnostic());
    }
    if warnings.len() + errors.len() > 1 {
        emitter.emit_summary(errors.len(), warnings.len());
    }
    emitter.flush();
}
