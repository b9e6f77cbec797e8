use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Lexical errors
/// - E1xxx: Parse errors
/// - E2xxx: Semantic errors
/// - E3xxx: Container format errors
/// - E4xxx: Asset conversion errors
/// - E9xxx: I/O and internal errors
/// - W2xxx: Semantic warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexical Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Unrecognised character in source
    E0002,
    /// Invalid integer literal
    E0003,
    /// Invalid resource reference literal
    E0004,

    // Parse Errors (E1xxx)
    /// Unexpected lexeme
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,

    // Semantic Errors (E2xxx)
    /// Unrecognised name (variable, function, type, module or field)
    E2001,
    /// Declared type incompatible with binary template tag
    E2002,
    /// Malformed repeatable clause
    E2003,
    /// Resource id collision or missing resource
    E2004,
    /// Invalid operands or value for an operation
    E2005,
    /// Duplicate definition
    E2006,

    // Format Errors (E3xxx)
    /// Container format does not match the required format
    E3001,
    /// Unrecognised container format
    E3002,
    /// Resource cannot be represented in the target format
    E3003,

    // Conversion Errors (E4xxx)
    /// Unsupported asset conversion
    E4001,

    // I/O and Internal Errors (E9xxx)
    /// File could not be read or written
    E9001,
    /// Internal compiler error
    E9002,

    // Semantic Warnings (W2xxx)
    /// Deprecated field assigned
    W2001,
}

impl ErrorCode {
    /// Get the string representation (e.g., "E2001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::W2001 => "W2001",
        }
    }

    /// Check if this is a lexical error (E0xxx range).
    pub fn is_lexical_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this is a parse error (E1xxx range).
    pub fn is_parse_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a semantic error (E2xxx range).
    pub fn is_semantic_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is a format error (E3xxx range).
    pub fn is_format_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is a conversion error (E4xxx range).
    pub fn is_conversion_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    /// Check if this is a warning (Wxxxx).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
