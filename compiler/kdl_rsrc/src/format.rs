//! Container formats.

use std::fmt;
use std::str::FromStr;

use kdl_diagnostic::{CompileError, ErrorCode};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Format {
    /// The Macintosh resource fork layout.
    Classic,
    /// The native Kestrel layout, with 64-bit ids and attributes.
    #[default]
    Extended,
    /// The rez archive layout.
    Rez,
}

impl Format {
    /// Resolve a format name as written in `@format` directives and on the
    /// command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "extended" | "kestrel" => Some(Format::Extended),
            "classic" | "rsrc" => Some(Format::Classic),
            "rez" => Some(Format::Rez),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Classic => "classic",
            Format::Extended => "extended",
            Format::Rez => "rez",
        }
    }

    /// Whether resources may carry attributes (and so namespaces).
    pub fn supports_attributes(self) -> bool {
        matches!(self, Format::Extended)
    }

    /// Whether ids beyond the 16-bit range can be stored.
    pub fn supports_wide_ids(self) -> bool {
        matches!(self, Format::Extended)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_name(s).ok_or_else(|| {
            CompileError::format(
                ErrorCode::E3002,
                format!("Unrecognised resource file format `{s}`"),
            )
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_format_aliases() {
        assert_eq!(Format::from_name("kestrel"), Some(Format::Extended));
        assert_eq!(Format::from_name("RSRC"), Some(Format::Classic));
        assert_eq!("rez".parse::<Format>().unwrap(), Format::Rez);
        assert_eq!("zip".parse::<Format>().unwrap_err().code(), ErrorCode::E3002);
        assert_eq!(Format::default(), Format::Extended);
    }
}
