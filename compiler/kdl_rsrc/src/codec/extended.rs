//! The extended layout: 64-bit ids and offsets plus per-type attributes.
//!
//! ```text
//! header   u64 version (1), u64 data_offset (256), u64 map_offset,
//!          u64 data_len, u64 map_len, zero padding to data_offset
//! data     per resource: u64 len, bytes
//! map      u64 type_count
//!          per type: code, u64 attribute_count, (cstr key, cstr value)*,
//!                    u64 resource_count,
//!                    per resource: i64 id, pstr name, u64 data_offset
//! ```

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use super::bytes::{ByteReader, ByteWriter};
use crate::{Attributes, Resource, ResourceFile, TypeCode};

const FORMAT: &str = "extended";
pub(super) const VERSION: u64 = 1;
const DATA_OFFSET: usize = 256;
const HEADER_LEN: usize = 40;

fn wide(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

pub(super) fn write(file: &ResourceFile) -> CompileResult<Vec<u8>> {
    let groups = file.type_groups();
    let mut data = ByteWriter::new();
    let mut map = ByteWriter::new();

    map.u64(wide(groups.len()));
    for group in &groups {
        map.bytes(&group.type_code.bytes());
        map.u64(wide(group.attributes.len()));
        for (key, value) in group.attributes {
            map.cstr(key);
            map.cstr(value);
        }
        map.u64(wide(group.resources.len()));
        for resource in &group.resources {
            map.i64(resource.id);
            map.pstr(&resource.name);
            map.u64(wide(data.len()));

            data.u64(wide(resource.data.len()));
            data.bytes(&resource.data);
        }
    }

    let mut out = ByteWriter::new();
    out.u64(VERSION);
    out.u64(wide(DATA_OFFSET));
    out.u64(wide(DATA_OFFSET + data.len()));
    out.u64(wide(data.len()));
    out.u64(wide(map.len()));
    out.zeros(DATA_OFFSET - HEADER_LEN);
    out.bytes(&data.into_bytes());
    out.bytes(&map.into_bytes());
    Ok(out.into_bytes())
}

fn offset(value: u64, what: &str) -> CompileResult<usize> {
    usize::try_from(value).map_err(|_| {
        CompileError::format(
            ErrorCode::E3001,
            format!("Malformed {FORMAT} resource file: {what} {value} is out of range"),
        )
    })
}

pub(super) fn read(bytes: &[u8]) -> CompileResult<ResourceFile> {
    let mut r = ByteReader::new(bytes, FORMAT);
    let version = r.u64("version")?;
    if version != VERSION {
        return Err(CompileError::format(
            ErrorCode::E3001,
            format!("Unsupported {FORMAT} resource file version {version}"),
        ));
    }
    let data_offset = offset(r.u64("data offset")?, "data offset")?;
    let map_offset = offset(r.u64("map offset")?, "map offset")?;

    r.seek(map_offset)?;
    let type_count = r.u64("type count")?;
    let mut file = ResourceFile::new();
    for _ in 0..type_count {
        let code: [u8; 4] = r
            .take(4, "type code")?
            .try_into()
            .map_err(|_| {
                CompileError::format(ErrorCode::E3001, "Malformed extended resource file: type code")
            })?;
        let mut attributes = Attributes::new();
        for _ in 0..r.u64("attribute count")? {
            let key = r.cstr("attribute key")?;
            let value = r.cstr("attribute value")?;
            attributes.insert(key, value);
        }
        for _ in 0..r.u64("resource count")? {
            let id = r.i64("resource id")?;
            let name = r.pstr("resource name")?;
            let entry = offset(r.u64("data offset")?, "data offset")?;

            let resume = r.position();
            let start = data_offset.checked_add(entry).ok_or_else(|| {
                CompileError::format(
                    ErrorCode::E3001,
                    format!("Malformed {FORMAT} resource file: data offset {entry} overflows"),
                )
            })?;
            r.seek(start)?;
            let len = offset(r.u64("resource size")?, "resource size")?;
            let data = r.take(len, "resource data")?.to_vec();
            r.seek(resume)?;

            let mut resource = Resource::new(TypeCode::from_bytes(code), id, name, data);
            resource.attributes.clone_from(&attributes);
            file.add(resource);
        }
    }
    Ok(file)
}
