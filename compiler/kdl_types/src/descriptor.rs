//! Type descriptors: the semantic type written after `as` in a field value.
//!
//! `Integer`, `Range<0, 100>`, `Bitmask`, `String`, `File`, `Image<PNG, PICT>`,
//! `Sound<WAV, snd>`, a nested type name such as `Rect`, or a reference
//! such as `Ship&`.

use std::fmt;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_ir::{Lexeme, LexemeKind, Location};

use crate::{BinaryField, Conversion, DataType};

/// Built-in descriptor names.
pub mod names {
    pub const INTEGER: &str = "Integer";
    pub const RANGE: &str = "Range";
    pub const BITMASK: &str = "Bitmask";
    pub const STRING: &str = "String";
    pub const FILE: &str = "File";
    pub const IMAGE: &str = "Image";
    pub const SOUND: &str = "Sound";
}

/// What a descriptor asks of its binary field.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DescriptorKind {
    Integer,
    Range,
    Bitmask,
    String,
    File,
    Image,
    Sound,
    /// A resource reference, optionally restricted to one type.
    Reference,
    /// Any other name: a nested type, or a type whose constructor builds
    /// the value.
    Named,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeDescriptor {
    pub is_reference: bool,
    /// Empty for an untyped reference.
    pub name: String,
    pub hints: Vec<Lexeme>,
    pub location: Location,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, location: &Location) -> Self {
        TypeDescriptor {
            is_reference: false,
            name: name.into(),
            hints: Vec::new(),
            location: location.clone(),
        }
    }

    pub fn reference(name: impl Into<String>, location: &Location) -> Self {
        TypeDescriptor {
            is_reference: true,
            ..TypeDescriptor::new(name, location)
        }
    }

    #[must_use]
    pub fn with_hints(mut self, hints: Vec<Lexeme>) -> Self {
        self.hints = hints;
        self
    }

    pub fn kind(&self) -> DescriptorKind {
        if self.is_reference {
            return DescriptorKind::Reference;
        }
        match self.name.as_str() {
            names::INTEGER => DescriptorKind::Integer,
            names::RANGE => DescriptorKind::Range,
            names::BITMASK => DescriptorKind::Bitmask,
            names::STRING => DescriptorKind::String,
            names::FILE => DescriptorKind::File,
            names::IMAGE => DescriptorKind::Image,
            names::SOUND => DescriptorKind::Sound,
            _ => DescriptorKind::Named,
        }
    }

    /// Infer a descriptor from the binary field a value is stored in.
    pub fn infer(field: &BinaryField) -> CompileResult<Self> {
        let location = &field.location;
        let nested = field.nested_type.clone().unwrap_or_default();
        let descriptor = match field.data_type {
            DataType::Nested | DataType::Rect => TypeDescriptor::new(nested, location),
            DataType::Rsrc => TypeDescriptor::reference(nested, location),
            t if t.is_integer() => TypeDescriptor::new(names::INTEGER, location),
            t if t.is_string() => TypeDescriptor::new(names::STRING, location),
            DataType::Hexd => TypeDescriptor::new(names::FILE, location),
            t => {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2002,
                    format!(
                        "Binary field '{}' is a {t} marker and cannot hold a value",
                        field.label
                    ),
                    location,
                ));
            }
        };
        Ok(descriptor)
    }

    /// Check the descriptor against the tag of the binary field it is
    /// stored in.
    pub fn verify_binary_type(&self, field: &BinaryField) -> CompileResult<()> {
        let tag = field.data_type;
        let nested = field.nested_type.as_deref().unwrap_or("");
        let kind = self.kind();

        if kind == DescriptorKind::Reference {
            if tag != DataType::Rsrc {
                return Err(self.mismatch(field));
            }
            if !nested.is_empty() && !self.name.is_empty() && nested != self.name {
                return Err(self.error(format!(
                    "Reference type `{}` does not match `{nested}`, the type referenced by binary field '{}'",
                    self.name, field.label
                )));
            }
            return Ok(());
        }

        let compatible = match kind {
            DescriptorKind::Named if !nested.is_empty() && self.name == nested => tag.is_nested(),
            DescriptorKind::Integer => tag.is_integer(),
            DescriptorKind::Range => return self.verify_range(field),
            DescriptorKind::Bitmask => tag.is_unsigned_integer(),
            DescriptorKind::String => tag.is_string(),
            DescriptorKind::File | DescriptorKind::Image | DescriptorKind::Sound => {
                self.conversion()?;
                !tag.is_list_marker()
            }
            DescriptorKind::Named | DescriptorKind::Reference => !tag.is_list_marker(),
        };
        if compatible {
            Ok(())
        } else {
            Err(self.mismatch(field))
        }
    }

    fn verify_range(&self, field: &BinaryField) -> CompileResult<()> {
        let [low, high] = self.hints.as_slice() else {
            return Err(self.error(format!(
                "`Range` requires exactly two hint values but {} were given",
                self.hints.len()
            )));
        };
        let tag = field.data_type;
        if tag.is_integer() {
            let numeric = |l: &Lexeme| matches!(l.kind, LexemeKind::Integer | LexemeKind::Percentage);
            if low.kind != high.kind || !numeric(low) {
                return Err(self.error(format!(
                    "`Range` hints for integer field '{}' must both be integers or both be percentages",
                    field.label
                )));
            }
            Ok(())
        } else if tag == DataType::Rsrc {
            if !low.is(LexemeKind::Reference) || !high.is(LexemeKind::Reference) {
                return Err(self.error(format!(
                    "`Range` hints for reference field '{}' must both be references",
                    field.label
                )));
            }
            Ok(())
        } else {
            Err(self.mismatch(field))
        }
    }

    /// The integer bounds of a `Range` descriptor.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match (self.kind(), self.hints.as_slice()) {
            (DescriptorKind::Range, [low, high]) => Some((low.integer_value()?, high.integer_value()?)),
            _ => None,
        }
    }

    /// Check an integer against the bounds of a `Range` descriptor.
    pub fn check_range(&self, value: i64, label: &str, location: &Location) -> CompileResult<()> {
        match self.integer_bounds() {
            Some((low, high)) if value < low || value > high => Err(CompileError::semantic_at(
                ErrorCode::E2005,
                format!("Value {value} of field '{label}' is outside the range {low} to {high}"),
                location,
            )),
            _ => Ok(()),
        }
    }

    /// The conversion requested by `File<A, B>`, `Image<A, B>` or
    /// `Sound<A, B>`, validated against the conversion matrix.
    pub fn conversion(&self) -> CompileResult<Option<Conversion>> {
        match (self.kind(), self.hints.as_slice()) {
            (
                DescriptorKind::File | DescriptorKind::Image | DescriptorKind::Sound,
                [input, output],
            ) => Conversion::new(input, output).map(Some),
            _ => Ok(None),
        }
    }

    fn mismatch(&self, field: &BinaryField) -> CompileError {
        self.error(format!(
            "Binary field '{}' is {}, which cannot store a value of type `{self}`",
            field.label, field.data_type
        ))
    }

    fn error(&self, message: String) -> CompileError {
        CompileError::semantic_at(ErrorCode::E2002, message, &self.location)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.hints.is_empty() {
            let hints: Vec<String> = self.hints.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", hints.join(", "))?;
        }
        if self.is_reference {
            f.write_str("&")?;
        }
        Ok(())
    }
}
