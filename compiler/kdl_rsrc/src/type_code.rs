//! Four-character resource type codes.

use std::fmt;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::mac_roman;

/// A four-byte resource type code, stored in its on-disk encoding.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TypeCode([u8; 4]);

impl TypeCode {
    /// Encode `code`, which must be exactly four characters.
    pub fn new(code: &str) -> CompileResult<Self> {
        let bytes = mac_roman::encode(code);
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| {
            CompileError::semantic(
                ErrorCode::E2002,
                format!("Type code \"{code}\" must be exactly four characters"),
            )
        })?;
        Ok(TypeCode(bytes))
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        TypeCode(bytes)
    }

    pub const fn bytes(self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mac_roman::decode(&self.0))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_type_code() {
        let code = TypeCode::new("snd ").unwrap();
        assert_eq!(code.bytes(), *b"snd ");
        assert_eq!(code.to_string(), "snd ");
        assert_eq!(TypeCode::new("rlëD").unwrap().bytes(), [b'r', b'l', 0x91, b'D']);
    }

    #[test]
    fn test_wrong_length() {
        let err = TypeCode::new("STR").unwrap_err();
        assert_eq!(err.message(), "Type code \"STR\" must be exactly four characters");
        assert!(TypeCode::new("STRNG").is_err());
    }
}
