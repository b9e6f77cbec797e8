//! The rez archive layout.
//!
//! ```text
//! header   "BRGR", u32 1, u32 12, u32 1, u32 128 (first index),
//!          u32 entry_count (resources + 1)           little-endian
//! index    per entry: u32 offset, u32 size, u32 0   little-endian
//! data     resource bytes, then the map
//! map      u32 8, u32 type_count                    big-endian
//!          per type: code, u32 entry_offset, u32 count
//!          per resource: u32 index, code, i16 id, name (256 bytes, NUL padded)
//! ```

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use super::bytes::{narrow, ByteReader, ByteWriter};
use crate::{mac_roman, Resource, ResourceFile, TypeCode};

const FORMAT: &str = "rez";
pub(super) const MAGIC: &[u8; 4] = b"BRGR";
const HEADER_LEN: usize = 24;
const INDEX_ENTRY_LEN: usize = 12;
const FIRST_INDEX: u32 = 128;
const MAP_HEADER_LEN: usize = 8;
const TYPE_ENTRY_LEN: usize = 12;
const NAME_LEN: usize = 256;
const RESOURCE_ENTRY_LEN: usize = 4 + 4 + 2 + NAME_LEN;

pub(super) fn write(file: &ResourceFile) -> CompileResult<Vec<u8>> {
    let groups = file.type_groups();
    let total: usize = groups.iter().map(|g| g.resources.len()).sum();
    let entry_count: u32 = narrow(total + 1, FORMAT, "number of resources")?;

    let mut index = ByteWriter::new();
    let mut data = ByteWriter::new();
    let mut map = ByteWriter::new();
    let data_start = HEADER_LEN + INDEX_ENTRY_LEN * (total + 1);

    map.u32(narrow(MAP_HEADER_LEN, FORMAT, "map header")?);
    map.u32(narrow(groups.len(), FORMAT, "number of resource types")?);
    let mut entry_offset = MAP_HEADER_LEN + TYPE_ENTRY_LEN * groups.len();
    for group in &groups {
        map.bytes(&group.type_code.bytes());
        map.u32(narrow(entry_offset, FORMAT, "map entry offset")?);
        map.u32(narrow(group.resources.len(), FORMAT, "number of resources of one type")?);
        entry_offset += RESOURCE_ENTRY_LEN * group.resources.len();
    }

    let mut next_index = FIRST_INDEX;
    for group in &groups {
        for resource in &group.resources {
            let id = super::short_id(resource, FORMAT)?;

            index.u32_le(narrow(data_start + data.len(), FORMAT, "data offset")?);
            index.u32_le(narrow(resource.data.len(), FORMAT, "resource size")?);
            index.u32_le(0);
            data.bytes(&resource.data);

            map.u32(next_index);
            map.bytes(&group.type_code.bytes());
            map.i16(id);
            let mut name = mac_roman::encode(&resource.name);
            name.truncate(NAME_LEN - 1);
            name.resize(NAME_LEN, 0);
            map.bytes(&name);
            next_index += 1;
        }
    }

    index.u32_le(narrow(data_start + data.len(), FORMAT, "map offset")?);
    index.u32_le(narrow(map.len(), FORMAT, "map size")?);
    index.u32_le(0);

    let mut out = ByteWriter::new();
    out.bytes(MAGIC);
    out.u32_le(1);
    out.u32_le(12);
    out.u32_le(1);
    out.u32_le(FIRST_INDEX);
    out.u32_le(entry_count);
    out.bytes(&index.into_bytes());
    out.bytes(&data.into_bytes());
    out.bytes(&map.into_bytes());
    Ok(out.into_bytes())
}

pub(super) fn read(bytes: &[u8]) -> CompileResult<ResourceFile> {
    let mut r = ByteReader::new(bytes, FORMAT);
    if r.take(4, "signature")? != MAGIC {
        return Err(CompileError::format(
            ErrorCode::E3001,
            "Malformed rez resource file: missing BRGR signature",
        ));
    }
    r.seek(16)?;
    let first_index = r.u32_le("first index")?;
    let entry_count = r.u32_le("entry count")? as usize;
    if entry_count == 0 {
        return Err(CompileError::format(
            ErrorCode::E3001,
            "Malformed rez resource file: no resource map entry",
        ));
    }

    let mut entries = Vec::with_capacity(entry_count);
    for _ in 0..entry_count {
        let offset = r.u32_le("index offset")? as usize;
        let size = r.u32_le("index size")? as usize;
        let _reserved = r.u32_le("index padding")?;
        entries.push((offset, size));
    }

    let Some(&(map_offset, _)) = entries.last() else {
        return Ok(ResourceFile::new());
    };
    r.seek(map_offset + 4)?;
    let type_count = r.u32("type count")? as usize;

    let mut file = ResourceFile::new();
    for t in 0..type_count {
        r.seek(map_offset + MAP_HEADER_LEN + TYPE_ENTRY_LEN * t + 4)?;
        let entry_offset = r.u32("map entry offset")? as usize;
        let count = r.u32("resource count")? as usize;

        for i in 0..count {
            r.seek(map_offset + entry_offset + RESOURCE_ENTRY_LEN * i)?;
            let index = r.u32("resource index")?;
            let code: [u8; 4] = r
                .take(4, "type code")?
                .try_into()
                .map_err(|_| CompileError::format(ErrorCode::E3001, "Malformed rez resource file: type code"))?;
            let id = r.i16("resource id")?;
            let raw_name = r.take(NAME_LEN, "resource name")?;
            let name_len = raw_name.iter().position(|b| *b == 0).unwrap_or(NAME_LEN);
            let name = mac_roman::decode(&raw_name[..name_len]);

            let slot = index
                .checked_sub(first_index)
                .and_then(|slot| entries.get(slot as usize))
                .ok_or_else(|| {
                    CompileError::format(
                        ErrorCode::E3001,
                        format!("Malformed rez resource file: resource index {index} has no index entry"),
                    )
                })?;
            r.seek(slot.0)?;
            let data = r.take(slot.1, "resource data")?.to_vec();
            file.add(Resource::new(TypeCode::from_bytes(code), i64::from(id), name, data));
        }
    }
    Ok(file)
}
