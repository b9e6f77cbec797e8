//! The error type every compiler phase returns.
//!
//! A single error aborts compilation of the current file. Variants follow
//! the compiler's error taxonomy and carry the location of the offending
//! lexeme when one exists.

use kdl_ir::{Lexeme, Location};

use crate::{Diagnostic, ErrorCode};

pub type CompileResult<T> = Result<T, CompileError>;

/// A failure raised by the lexer, analyzer, synthesizer or writer.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum CompileError {
    /// Malformed literal or unrecognised character.
    #[error("{location}: {message}")]
    Lexical {
        code: ErrorCode,
        message: String,
        location: Location,
    },

    /// Unexpected lexeme or missing punctuation.
    #[error("{location}: {message}")]
    Parse {
        code: ErrorCode,
        message: String,
        location: Location,
    },

    /// Name resolution, typing, repeatable and resource-id violations.
    #[error("{}{message}", prefix(.location))]
    Semantic {
        code: ErrorCode,
        message: String,
        location: Option<Location>,
    },

    /// Unsupported or mismatched container format.
    #[error("{}{message}", prefix(.location))]
    Format {
        code: ErrorCode,
        message: String,
        location: Option<Location>,
    },

    /// Unsupported source to destination asset conversion.
    #[error("{}{message}", prefix(.location))]
    Conversion {
        message: String,
        location: Option<Location>,
    },

    /// A file could not be read or written.
    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

fn prefix(location: &Option<Location>) -> String {
    match location {
        Some(location) if !location.is_synthesized() => format!("{location}: "),
        _ => String::new(),
    }
}

impl CompileError {
    pub fn lexical(code: ErrorCode, message: impl Into<String>, location: Location) -> Self {
        CompileError::Lexical {
            code,
            message: message.into(),
            location,
        }
    }

    /// Structural error at `location`, coded as an unexpected lexeme.
    pub fn parse(message: impl Into<String>, location: &Location) -> Self {
        CompileError::Parse {
            code: ErrorCode::E1001,
            message: message.into(),
            location: location.clone(),
        }
    }

    /// Structural error reported against the lexeme that broke the rule.
    pub fn unexpected(message: impl Into<String>, lexeme: &Lexeme) -> Self {
        CompileError::Parse {
            code: ErrorCode::E1001,
            message: format!("{} (found {})", message.into(), lexeme),
            location: lexeme.location.clone(),
        }
    }

    pub fn semantic(code: ErrorCode, message: impl Into<String>) -> Self {
        CompileError::Semantic {
            code,
            message: message.into(),
            location: None,
        }
    }

    pub fn semantic_at(code: ErrorCode, message: impl Into<String>, location: &Location) -> Self {
        CompileError::Semantic {
            code,
            message: message.into(),
            location: Some(location.clone()),
        }
    }

    pub fn format(code: ErrorCode, message: impl Into<String>) -> Self {
        CompileError::Format {
            code,
            message: message.into(),
            location: None,
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        CompileError::Conversion {
            message: message.into(),
            location: None,
        }
    }

    pub fn io(path: impl Into<String>, error: &std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Attach a location if the error does not have one yet.
    #[must_use]
    pub fn located(mut self, at: &Location) -> Self {
        match &mut self {
            CompileError::Semantic { location, .. }
            | CompileError::Format { location, .. }
            | CompileError::Conversion { location, .. } => {
                if location.is_none() {
                    *location = Some(at.clone());
                }
            }
            CompileError::Lexical { .. } | CompileError::Parse { .. } | CompileError::Io { .. } => {}
        }
        self
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Lexical { code, .. }
            | CompileError::Parse { code, .. }
            | CompileError::Semantic { code, .. }
            | CompileError::Format { code, .. } => *code,
            CompileError::Conversion { .. } => ErrorCode::E4001,
            CompileError::Io { .. } => ErrorCode::E9001,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Lexical { message, .. }
            | CompileError::Parse { message, .. }
            | CompileError::Semantic { message, .. }
            | CompileError::Format { message, .. }
            | CompileError::Conversion { message, .. }
            | CompileError::Io { message, .. } => message,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            CompileError::Lexical { location, .. } | CompileError::Parse { location, .. } => {
                Some(location)
            }
            CompileError::Semantic { location, .. }
            | CompileError::Format { location, .. }
            | CompileError::Conversion { location, .. } => location.as_ref(),
            CompileError::Io { .. } => None,
        }
    }

    /// Name of the error category, as shown in the diagnostic note.
    pub fn category(&self) -> &'static str {
        match self {
            CompileError::Lexical { .. } => "lexical error",
            CompileError::Parse { .. } => "parse error",
            CompileError::Semantic { .. } => "semantic error",
            CompileError::Format { .. } => "format error",
            CompileError::Conversion { .. } => "conversion error",
            CompileError::Io { .. } => "i/o error",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code()).with_message(self.message());
        if let Some(location) = self.location().filter(|l| !l.is_synthesized()) {
            diag = diag.with_label(location.clone(), self.category());
        }
        if let CompileError::Io { path, .. } = self {
            diag = diag.with_note(format!("while accessing `{path}`"));
        }
        diag
    }
}
