//! Semantic analysis for KDL.
//!
//! A [`CompileSession`] owns every registry a compilation needs: the type
//! table, the root scope with its built-in functions, the imported module
//! set, and the resources declared so far. Sources are lexed and handed to
//! the parser, which processes directives, registers type definitions and
//! synthesizes a [`ResourceInstance`] per declaration. The [`Encoder`] turns
//! instances into resource bytes and the session writes them out in the
//! selected container format.
//!
//! Sessions share nothing. Callers that want throughput run one session per
//! output file on their own thread.

mod config;
mod encoder;
mod grammar;
mod instance;
mod modules;
mod parser;
mod session;
mod synthesizer;

pub use config::{AssetConverter, Metadata, PassthroughConverter, SessionConfig};
pub use encoder::Encoder;
pub use instance::{FieldSet, ResourceInstance, Slot};
pub use modules::{builtin_module, BUILTIN_MODULES};
pub use session::CompileSession;

/// Variable bound to the current repetition while a repeatable field is
/// filled.
pub const FIELD_NUMBER: &str = "FieldNumber";
