//! Binary field tags.

use std::fmt;

/// The binary encoding of one template field.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DataType {
    /// Signed integers of 1, 2, 4 and 8 bytes.
    Dbyt,
    Dwrd,
    Dlng,
    Dqad,
    /// Unsigned integers of 1, 2, 4 and 8 bytes.
    Hbyt,
    Hwrd,
    Hlng,
    Hqad,
    /// Raw bytes of any length.
    Hexd,
    /// Length-prefixed string.
    Pstr,
    /// NUL-terminated string.
    Cstr,
    /// Fixed-width string of the given byte width.
    Cnnn(u16),
    /// A rectangle, encoded through the implicit `Rect` type.
    Rect,
    /// Entry count of the following list.
    Ocnt,
    /// Start and end markers of a counted list.
    Lstc,
    Lste,
    /// A reference to another resource.
    Rsrc,
    /// Another type's template, inlined.
    Nested,
}

impl DataType {
    /// Look up a template tag. `Nested` is spelled `Nested<Type>` in
    /// templates; only the bare name is matched here.
    ///
    /// `Cnnn` widths are hexadecimal: `C020` is 32 bytes wide.
    pub fn for_name(name: &str) -> Option<Self> {
        let data_type = match name {
            "DBYT" => DataType::Dbyt,
            "DWRD" => DataType::Dwrd,
            "DLNG" => DataType::Dlng,
            "DQAD" => DataType::Dqad,
            "HBYT" => DataType::Hbyt,
            "HWRD" => DataType::Hwrd,
            "HLNG" => DataType::Hlng,
            "HQAD" => DataType::Hqad,
            "HEXD" => DataType::Hexd,
            "PSTR" => DataType::Pstr,
            "CSTR" => DataType::Cstr,
            "RECT" => DataType::Rect,
            "OCNT" => DataType::Ocnt,
            "LSTC" => DataType::Lstc,
            "LSTE" => DataType::Lste,
            "RSRC" => DataType::Rsrc,
            "Nested" => DataType::Nested,
            _ => {
                let width = name.strip_prefix('C')?;
                if width.len() != 3 || !width.chars().all(|c| c.is_ascii_hexdigit()) {
                    return None;
                }
                let width = u16::from_str_radix(width, 16).ok().filter(|w| *w > 0)?;
                DataType::Cnnn(width)
            }
        };
        Some(data_type)
    }

    /// Fixed encoded width in bytes, or 0 for variable-width tags.
    pub fn base_size(self) -> usize {
        match self {
            DataType::Cstr | DataType::Pstr | DataType::Hbyt | DataType::Dbyt => 1,
            DataType::Hwrd | DataType::Dwrd | DataType::Ocnt => 2,
            DataType::Hlng | DataType::Dlng => 4,
            DataType::Rect | DataType::Hqad | DataType::Dqad => 8,
            DataType::Rsrc => 9,
            DataType::Cnnn(width) => usize::from(width),
            DataType::Hexd | DataType::Nested | DataType::Lstc | DataType::Lste => 0,
        }
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            DataType::Dbyt | DataType::Dwrd | DataType::Dlng | DataType::Dqad
        )
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            DataType::Hbyt | DataType::Hwrd | DataType::Hlng | DataType::Hqad | DataType::Ocnt
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_string(self) -> bool {
        matches!(self, DataType::Cstr | DataType::Pstr | DataType::Cnnn(_))
    }

    /// Tags whose value is another type's fields.
    pub fn is_nested(self) -> bool {
        matches!(self, DataType::Nested | DataType::Rect)
    }

    /// List markers carry no value of their own.
    pub fn is_list_marker(self) -> bool {
        matches!(self, DataType::Lstc | DataType::Lste)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Dbyt => "DBYT",
            DataType::Dwrd => "DWRD",
            DataType::Dlng => "DLNG",
            DataType::Dqad => "DQAD",
            DataType::Hbyt => "HBYT",
            DataType::Hwrd => "HWRD",
            DataType::Hlng => "HLNG",
            DataType::Hqad => "HQAD",
            DataType::Hexd => "HEXD",
            DataType::Pstr => "PSTR",
            DataType::Cstr => "CSTR",
            DataType::Cnnn(width) => return write!(f, "C{width:03X}"),
            DataType::Rect => "RECT",
            DataType::Ocnt => "OCNT",
            DataType::Lstc => "LSTC",
            DataType::Lste => "LSTE",
            DataType::Rsrc => "RSRC",
            DataType::Nested => "Nested",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_for_name() {
        assert_eq!(DataType::for_name("DWRD"), Some(DataType::Dwrd));
        assert_eq!(DataType::for_name("Nested"), Some(DataType::Nested));
        assert_eq!(DataType::for_name("C020"), Some(DataType::Cnnn(32)));
        assert_eq!(DataType::for_name("C00F"), Some(DataType::Cnnn(15)));
        assert_eq!(DataType::for_name("C000"), None);
        assert_eq!(DataType::for_name("CSTRX"), None);
        assert_eq!(DataType::for_name("WORD"), None);
    }

    #[test]
    fn test_base_size() {
        assert_eq!(DataType::Dbyt.base_size(), 1);
        assert_eq!(DataType::Ocnt.base_size(), 2);
        assert_eq!(DataType::Hlng.base_size(), 4);
        assert_eq!(DataType::Rect.base_size(), 8);
        assert_eq!(DataType::Rsrc.base_size(), 9);
        assert_eq!(DataType::for_name("C100").unwrap().base_size(), 256);
        assert_eq!(DataType::Hexd.base_size(), 0);
    }

    #[test]
    fn test_display_round_trips_names() {
        for name in ["DQAD", "HWRD", "C020", "LSTC", "RSRC"] {
            assert_eq!(DataType::for_name(name).unwrap().to_string(), name);
        }
    }
}
