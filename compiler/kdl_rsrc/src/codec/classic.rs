//! The Macintosh resource fork layout.
//!
//! ```text
//! header   u32 data_offset (256), u32 map_offset, u32 data_len, u32 map_len
//!          240 bytes of zeros
//! data     per resource: u32 len, bytes
//! map      header copy, u32 0, u16 0, u16 0,
//!          u16 type_list_offset (28), u16 name_list_offset
//!          type list: u16 type_count - 1,
//!                     per type: code, u16 count - 1, u16 ref_list_offset
//!          reference lists: i16 id, u16 name_offset | 0xFFFF,
//!                           u8 attributes, u24 data_offset, u32 0
//!          name list: pstr per named resource
//! ```

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use super::bytes::{narrow, ByteReader, ByteWriter};
use crate::{Resource, ResourceFile, TypeCode};

const FORMAT: &str = "classic";
const DATA_OFFSET: u32 = 256;
const HEADER_LEN: usize = 16;
const TYPE_LIST_OFFSET: u16 = 28;
const REFERENCE_LEN: usize = 12;
const NO_NAME: u16 = 0xFFFF;
const MAX_DATA_OFFSET: usize = 0x00FF_FFFF;

pub(super) fn write(file: &ResourceFile) -> CompileResult<Vec<u8>> {
    let groups = file.type_groups();

    let mut data = ByteWriter::new();
    let mut names = ByteWriter::new();
    let mut references = ByteWriter::new();
    let mut type_list = ByteWriter::new();

    let type_count: u16 = narrow(groups.len(), FORMAT, "number of resource types")?;
    type_list.u16(type_count.wrapping_sub(1));
    let mut ref_list_offset = 2 + 8 * groups.len();

    for group in &groups {
        let count: u16 = narrow(group.resources.len(), FORMAT, "number of resources of one type")?;
        type_list.bytes(&group.type_code.bytes());
        type_list.u16(count.wrapping_sub(1));
        type_list.u16(narrow(ref_list_offset, FORMAT, "reference list offset")?);
        ref_list_offset += REFERENCE_LEN * group.resources.len();

        for resource in &group.resources {
            let id = super::short_id(resource, FORMAT)?;

            let data_offset = data.len();
            if data_offset > MAX_DATA_OFFSET {
                return Err(CompileError::format(
                    ErrorCode::E3003,
                    "Resource data exceeds the 16MB addressable by the classic format",
                ));
            }
            data.u32(narrow(resource.data.len(), FORMAT, "resource size")?);
            data.bytes(&resource.data);

            let name_offset = if resource.name.is_empty() {
                NO_NAME
            } else {
                let offset = narrow(names.len(), FORMAT, "name list")?;
                names.pstr(&resource.name);
                offset
            };

            references.i16(id);
            references.u16(name_offset);
            references.u8(0);
            references.u24(narrow(data_offset, FORMAT, "data offset")?);
            references.u32(0);
        }
    }

    let map_len = HEADER_LEN + 4 + 2 + 2 + 2 + 2 + type_list.len() + references.len() + names.len();
    let name_list_offset = usize::from(TYPE_LIST_OFFSET) + type_list.len() + references.len();
    let data_len: u32 = narrow(data.len(), FORMAT, "resource data")?;
    let map_offset = DATA_OFFSET.checked_add(data_len).ok_or_else(|| {
        CompileError::format(
            ErrorCode::E3003,
            "Resource data is too large for the classic format",
        )
    })?;
    let map_len: u32 = narrow(map_len, FORMAT, "resource map")?;

    let header = |w: &mut ByteWriter| {
        w.u32(DATA_OFFSET);
        w.u32(map_offset);
        w.u32(data_len);
        w.u32(map_len);
    };

    let mut out = ByteWriter::new();
    header(&mut out);
    out.zeros(240);
    out.bytes(&data.into_bytes());

    header(&mut out);
    out.u32(0);
    out.u16(0);
    out.u16(0);
    out.u16(TYPE_LIST_OFFSET);
    out.u16(narrow(name_list_offset, FORMAT, "name list offset")?);
    out.bytes(&type_list.into_bytes());
    out.bytes(&references.into_bytes());
    out.bytes(&names.into_bytes());

    Ok(out.into_bytes())
}

pub(super) fn read(bytes: &[u8]) -> CompileResult<ResourceFile> {
    let mut r = ByteReader::new(bytes, FORMAT);
    let data_offset = r.u32("data offset")? as usize;
    let map_offset = r.u32("map offset")? as usize;

    r.seek(map_offset + HEADER_LEN + 4 + 2 + 2)?;
    let type_list = map_offset + usize::from(r.u16("type list offset")?);
    let name_list = map_offset + usize::from(r.u16("name list offset")?);

    r.seek(type_list)?;
    let type_count = usize::from(r.u16("type count")?.wrapping_add(1));

    let mut file = ResourceFile::new();
    for t in 0..type_count {
        r.seek(type_list + 2 + 8 * t)?;
        let code: [u8; 4] = r
            .take(4, "type code")?
            .try_into()
            .map_err(|_| malformed("type code"))?;
        let count = usize::from(r.u16("resource count")?.wrapping_add(1));
        let references = type_list + usize::from(r.u16("reference list offset")?);

        for i in 0..count {
            r.seek(references + REFERENCE_LEN * i)?;
            let id = r.i16("resource id")?;
            let name_offset = r.u16("name offset")?;
            let _attributes = r.u8("attributes")?;
            let offset = r.u24("data offset")? as usize;

            let name = if name_offset == NO_NAME {
                String::new()
            } else {
                r.seek(name_list + usize::from(name_offset))?;
                r.pstr("resource name")?
            };

            r.seek(data_offset + offset)?;
            let len = r.u32("resource size")? as usize;
            let data = r.take(len, "resource data")?.to_vec();

            file.add(Resource::new(TypeCode::from_bytes(code), i64::from(id), name, data));
        }
    }
    Ok(file)
}

fn malformed(what: &str) -> CompileError {
    CompileError::format(
        ErrorCode::E3001,
        format!("Malformed {FORMAT} resource file: invalid {what}"),
    )
}
