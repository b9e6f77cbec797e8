//! Endian-aware byte buffers.

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::mac_roman;

/// Growable output buffer. Multi-byte values are big-endian unless the
/// method says otherwise.
#[derive(Default, Debug)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        ByteWriter::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn i8(&mut self, v: i8) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u16(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i16(&mut self, v: i16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u64(&mut self, v: u64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i64(&mut self, v: i64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u32_le(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    /// Low three bytes of `v`, big-endian.
    pub fn u24(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes()[1..]);
    }

    pub fn bytes(&mut self, v: &[u8]) {
        self.bytes.extend_from_slice(v);
    }

    pub fn zeros(&mut self, n: usize) {
        self.bytes.resize(self.bytes.len() + n, 0);
    }

    /// Length-prefixed MacRoman string, truncated to 255 bytes.
    pub fn pstr(&mut self, text: &str) {
        let mut encoded = mac_roman::encode(text);
        encoded.truncate(usize::from(u8::MAX));
        self.u8(u8::try_from(encoded.len()).unwrap_or(u8::MAX));
        self.bytes(&encoded);
    }

    /// NUL-terminated MacRoman string.
    pub fn cstr(&mut self, text: &str) {
        self.bytes(&mac_roman::encode(text));
        self.u8(0);
    }
}

/// Cursor over input bytes. Running off the end is a format error.
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    format: &'static str,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8], format: &'static str) -> Self {
        ByteReader {
            bytes,
            pos: 0,
            format,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) -> CompileResult<()> {
        if pos > self.bytes.len() {
            return Err(self.truncated("seek target"));
        }
        self.pos = pos;
        Ok(())
    }

    fn truncated(&self, what: &str) -> CompileError {
        CompileError::format(
            ErrorCode::E3001,
            format!(
                "Malformed {} resource file: unexpected end of data reading {what} at offset {}",
                self.format, self.pos
            ),
        )
    }

    pub fn take(&mut self, n: usize, what: &str) -> CompileResult<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(self.truncated(what)),
        }
    }

    fn array<const N: usize>(&mut self, what: &str) -> CompileResult<[u8; N]> {
        let slice = self.take(N, what)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn u8(&mut self, what: &str) -> CompileResult<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    pub fn u16(&mut self, what: &str) -> CompileResult<u16> {
        self.array(what).map(u16::from_be_bytes)
    }

    pub fn i16(&mut self, what: &str) -> CompileResult<i16> {
        self.array(what).map(i16::from_be_bytes)
    }

    pub fn u24(&mut self, what: &str) -> CompileResult<u32> {
        let [a, b, c] = self.array::<3>(what)?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn u32(&mut self, what: &str) -> CompileResult<u32> {
        self.array(what).map(u32::from_be_bytes)
    }

    pub fn u32_le(&mut self, what: &str) -> CompileResult<u32> {
        self.array(what).map(u32::from_le_bytes)
    }

    pub fn u64(&mut self, what: &str) -> CompileResult<u64> {
        self.array(what).map(u64::from_be_bytes)
    }

    pub fn i64(&mut self, what: &str) -> CompileResult<i64> {
        self.array(what).map(i64::from_be_bytes)
    }

    pub fn pstr(&mut self, what: &str) -> CompileResult<String> {
        let len = self.u8(what)?;
        let bytes = self.take(usize::from(len), what)?;
        Ok(mac_roman::decode(bytes))
    }

    pub fn cstr(&mut self, what: &str) -> CompileResult<String> {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| self.truncated(what))?;
        let text = mac_roman::decode(&rest[..len]);
        self.pos += len + 1;
        Ok(text)
    }
}

/// Convert a length or offset to the width a format stores it in.
pub fn narrow<T: TryFrom<usize>>(value: usize, format: &str, what: &str) -> CompileResult<T> {
    T::try_from(value).map_err(|_| {
        CompileError::format(
            ErrorCode::E3003,
            format!("The {what} ({value}) is too large for the {format} format"),
        )
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_writer_endianness() {
        let mut w = ByteWriter::new();
        w.u16(0x0102);
        w.u32_le(0x0A0B_0C0D);
        w.u24(0x00AB_CDEF);
        w.i16(-2);
        assert_eq!(
            w.into_bytes(),
            vec![0x01, 0x02, 0x0D, 0x0C, 0x0B, 0x0A, 0xAB, 0xCD, 0xEF, 0xFF, 0xFE]
        );
    }

    #[test]
    fn test_strings() {
        let mut w = ByteWriter::new();
        w.pstr("Hi");
        w.cstr("Yo");
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![2, b'H', b'i', b'Y', b'o', 0]);

        let mut r = ByteReader::new(&bytes, "test");
        assert_eq!(r.pstr("name").unwrap(), "Hi");
        assert_eq!(r.cstr("key").unwrap(), "Yo");
        assert_eq!(r.position(), 6);
    }

    #[test]
    fn test_pstr_truncates() {
        let mut w = ByteWriter::new();
        w.pstr(&"x".repeat(300));
        let bytes = w.into_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 256);
    }

    #[test]
    fn test_reader_reports_truncation() {
        let mut r = ByteReader::new(&[0, 1], "classic");
        assert_eq!(r.u16("count").unwrap(), 1);
        let err = r.u32("offset").unwrap_err();
        assert_eq!(err.code(), ErrorCode::E3001);
        assert_eq!(
            err.message(),
            "Malformed classic resource file: unexpected end of data reading offset at offset 2"
        );
    }
}
