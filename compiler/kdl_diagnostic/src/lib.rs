//! Diagnostic system for the KDL resource compiler.
//!
//! Every phase fails with a [`CompileError`]. The driver turns it into a
//! [`Diagnostic`] and renders it through a [`emitter::DiagnosticEmitter`]:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - A `file:line:offset` location (where it went wrong)
//! - Notes and suggestions (how to fix)

mod diagnostic;
pub mod emitter;
mod error;
mod error_code;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error::{CompileError, CompileResult};
pub use error_code::ErrorCode;
