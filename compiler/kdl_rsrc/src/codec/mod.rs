//! Encoding and decoding of resource container files.
//!
//! All three formats share the logical model of [`ResourceFile`]; they
//! differ in layout and in what they can represent. Classic and rez files
//! store 16-bit ids and cannot carry attributes, so resources with a
//! namespace only survive in the extended format.

pub mod bytes;
mod classic;
mod extended;
mod rez;

use std::path::Path;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::{Format, Resource, ResourceFile};

/// Serialize `file` in `format`.
#[tracing::instrument(level = "debug", skip(file), fields(resources = file.len()))]
pub fn write(file: &ResourceFile, format: Format) -> CompileResult<Vec<u8>> {
    let bytes = match format {
        Format::Classic => classic::write(file)?,
        Format::Extended => extended::write(file)?,
        Format::Rez => rez::write(file)?,
    };
    tracing::debug!(bytes = bytes.len(), "encoded resource file");
    Ok(bytes)
}

/// Check that `resource` is representable in `format` on its own. The
/// classic and rez writers apply the same checks.
pub fn check(resource: &Resource, format: Format) -> CompileResult<()> {
    if format.supports_attributes() && format.supports_wide_ids() {
        return Ok(());
    }
    short_id(resource, format.name()).map(|_| ())
}

/// The id of `resource` as stored by the 16-bit formats, which cannot
/// carry attributes either.
fn short_id(resource: &Resource, format: &str) -> CompileResult<i16> {
    if let Some((key, value)) = resource.attributes.iter().next() {
        return Err(CompileError::format(
            ErrorCode::E3003,
            format!(
                "The {format} format cannot record the attribute {key}=\"{value}\" on '{}' resources",
                resource.type_code
            ),
        ));
    }
    i16::try_from(resource.id).map_err(|_| {
        CompileError::format(
            ErrorCode::E3003,
            format!(
                "Resource #{} of type '{}' does not fit the 16-bit ids of the {format} format",
                resource.id, resource.type_code
            ),
        )
    })
}

/// Serialize `file` and write it to `path`.
pub fn write_file(file: &ResourceFile, format: Format, path: &Path) -> CompileResult<()> {
    let bytes = write(file, format)?;
    std::fs::write(path, bytes).map_err(|e| CompileError::io(path.display().to_string(), &e))
}

/// Guess the format of encoded bytes from their header.
pub fn detect(bytes: &[u8]) -> Format {
    if bytes.starts_with(rez::MAGIC) {
        Format::Rez
    } else if bytes.starts_with(&extended::VERSION.to_be_bytes()) {
        Format::Extended
    } else {
        Format::Classic
    }
}

/// Decode a container of any supported format.
pub fn read(bytes: &[u8]) -> CompileResult<(Format, ResourceFile)> {
    let format = detect(bytes);
    let file = match format {
        Format::Classic => classic::read(bytes)?,
        Format::Extended => extended::read(bytes)?,
        Format::Rez => rez::read(bytes)?,
    };
    Ok((format, file))
}

pub fn read_file(path: &Path) -> CompileResult<(Format, ResourceFile)> {
    let bytes =
        std::fs::read(path).map_err(|e| CompileError::io(path.display().to_string(), &e))?;
    read(&bytes)
}
