//! Binary encoding of resource instances.
//!
//! The template is walked in order. Integers are big-endian at their tag
//! width, strings are MacRoman, and a counted list writes its entry count
//! followed by each entry.

use std::ops::Range;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_eval::{ensure_sufficient_stack, Value};
use kdl_ir::{Location, ResourceReference};
use kdl_rsrc::codec::bytes::ByteWriter;
use kdl_rsrc::{mac_roman, Format, ReferenceFlags};
use kdl_types::{BinaryField, DataType, TypeDefinition, TypeTable};

use crate::instance::{FieldSet, ResourceInstance, Slot};

/// Turns resource instances into resource data for one container format.
pub struct Encoder<'a> {
    types: &'a TypeTable,
    format: Format,
}

impl<'a> Encoder<'a> {
    pub fn new(types: &'a TypeTable, format: Format) -> Self {
        Encoder { types, format }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(ty = %instance.type_name, id = instance.id))]
    pub fn encode(&self, instance: &ResourceInstance) -> CompileResult<Vec<u8>> {
        let definition = self.types.named(&instance.type_name, &Location::synthesized())?;
        let mut out = ByteWriter::new();
        self.write_range(definition, 0..definition.template().len(), &instance.fields, &mut out)?;
        Ok(out.into_bytes())
    }

    fn write_range(
        &self,
        definition: &TypeDefinition,
        range: Range<usize>,
        set: &FieldSet,
        out: &mut ByteWriter,
    ) -> CompileResult<()> {
        let template = definition.template();
        let mut index = range.start;
        while index < range.end {
            let Some(field) = template.at(index) else {
                break;
            };
            if let Some(region) = template.list_region(&field.label) {
                let entries = set.list(&field.label);
                let count = i64::try_from(entries.len()).unwrap_or(i64::MAX);
                self.write_integer(field, count, &field.location, out)?;
                for entry in entries {
                    self.write_range(definition, region.members.clone(), entry, out)?;
                }
                index = region.members.end + 1;
                continue;
            }
            match field.data_type {
                DataType::Lstc | DataType::Lste => {}
                DataType::Nested | DataType::Rect => {
                    let name = field.nested_type.as_deref().unwrap_or_default();
                    let nested = self.types.named(name, &field.location)?;
                    let empty = FieldSet::default();
                    let child = set.nested(&field.label).unwrap_or(&empty);
                    ensure_sufficient_stack(|| {
                        self.write_range(nested, 0..nested.template().len(), child, out)
                    })?;
                }
                _ => match set.get(&field.label) {
                    Some(Slot::Value(value, location)) => self.write_value(field, value, location, out)?,
                    _ => self.write_zeros(field, out),
                },
            }
            index += 1;
        }
        Ok(())
    }

    fn write_zeros(&self, field: &BinaryField, out: &mut ByteWriter) {
        match field.data_type {
            DataType::Rsrc if self.format == Format::Classic => out.zeros(2),
            data_type => out.zeros(data_type.base_size()),
        }
    }

    fn write_value(
        &self,
        field: &BinaryField,
        value: &Value,
        location: &Location,
        out: &mut ByteWriter,
    ) -> CompileResult<()> {
        let data_type = field.data_type;
        if data_type.is_integer() {
            let integer = match value {
                Value::Reference(reference) => reference_id(reference, field, location)?,
                other => other
                    .as_integer()
                    .ok_or_else(|| cannot_encode(field, value, location))?,
            };
            return self.write_integer(field, integer, location, out);
        }

        match data_type {
            DataType::Pstr => {
                let mut bytes = text_bytes(value);
                bytes.truncate(usize::from(u8::MAX));
                out.u8(u8::try_from(bytes.len()).unwrap_or(u8::MAX));
                out.bytes(&bytes);
            }
            DataType::Cstr => {
                out.bytes(&text_bytes(value));
                out.u8(0);
            }
            DataType::Cnnn(width) => {
                let width = usize::from(width);
                let mut bytes = text_bytes(value);
                bytes.resize(width.saturating_sub(1), 0);
                bytes.resize(width, 0);
                out.bytes(&bytes);
            }
            DataType::Hexd => out.bytes(&text_bytes(value)),
            DataType::Rsrc => {
                let reference = match value {
                    Value::Reference(reference) => reference.clone(),
                    Value::Integer(id) => ResourceReference::with_id(*id),
                    _ => return Err(cannot_encode(field, value, location)),
                };
                self.write_reference(field, &reference, location, out)?;
            }
            _ => return Err(cannot_encode(field, value, location)),
        }
        Ok(())
    }

    fn write_integer(
        &self,
        field: &BinaryField,
        value: i64,
        location: &Location,
        out: &mut ByteWriter,
    ) -> CompileResult<()> {
        let overflow = || {
            CompileError::semantic_at(
                ErrorCode::E2005,
                format!(
                    "Value {value} does not fit in field '{}' ({})",
                    field.label, field.data_type
                ),
                location,
            )
        };
        match field.data_type {
            DataType::Dbyt => out.i8(i8::try_from(value).map_err(|_| overflow())?),
            DataType::Dwrd => out.i16(i16::try_from(value).map_err(|_| overflow())?),
            DataType::Dlng => out.i32(i32::try_from(value).map_err(|_| overflow())?),
            DataType::Dqad => out.i64(value),
            DataType::Hbyt => out.u8(u8::try_from(value).map_err(|_| overflow())?),
            DataType::Hwrd | DataType::Ocnt => out.u16(u16::try_from(value).map_err(|_| overflow())?),
            DataType::Hlng => out.u32(u32::try_from(value).map_err(|_| overflow())?),
            DataType::Hqad => out.u64(u64::try_from(value).map_err(|_| overflow())?),
            _ => return Err(cannot_encode(field, &Value::Integer(value), location)),
        }
        Ok(())
    }

    /// Classic files hold a bare `i16` id. The other formats write flags,
    /// then the optional namespace and type code, then an `i64` id.
    fn write_reference(
        &self,
        field: &BinaryField,
        reference: &ResourceReference,
        location: &Location,
        out: &mut ByteWriter,
    ) -> CompileResult<()> {
        let id = reference_id(reference, field, location)?;
        if self.format == Format::Classic {
            let id = i16::try_from(id).map_err(|_| {
                CompileError::format(
                    ErrorCode::E3003,
                    format!("Resource id {id} in field '{}' does not fit the classic format", field.label),
                )
                .located(location)
            })?;
            out.i16(id);
            return Ok(());
        }

        let code = match &reference.type_name {
            Some(name) => Some(self.types.named(name, location)?.code()),
            None => None,
        };
        let mut flags = ReferenceFlags::empty();
        flags.set(ReferenceFlags::NAMESPACE, reference.namespace.is_some());
        flags.set(ReferenceFlags::TYPE, code.is_some());
        out.u8(flags.bits());
        if let Some(namespace) = &reference.namespace {
            out.pstr(namespace);
        }
        if let Some(code) = code {
            out.bytes(&code.bytes());
        }
        out.i64(id);
        Ok(())
    }
}

fn reference_id(reference: &ResourceReference, field: &BinaryField, location: &Location) -> CompileResult<i64> {
    reference.id.ok_or_else(|| {
        CompileError::semantic_at(
            ErrorCode::E2005,
            format!("An #auto reference cannot be stored in binary field '{}'", field.label),
            location,
        )
    })
}

/// Bytes of a string-like value: data as is, anything else as MacRoman text.
fn text_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Data(data) => data.clone(),
        other => mac_roman::encode(&other.text()),
    }
}

fn cannot_encode(field: &BinaryField, value: &Value, location: &Location) -> CompileError {
    CompileError::semantic_at(
        ErrorCode::E2002,
        format!(
            "Binary field '{}' is {}, which cannot store a value of type `{}`",
            field.label,
            field.data_type,
            value.type_name()
        ),
        location,
    )
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
