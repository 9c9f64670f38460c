//! Binary FBX record reader.
//!
//! Layout (all little endian):
//!
//! ```text
//! "Kaydara FBX Binary  \0" 0x1A 0x00 <u32 version>
//! node    := end_offset num_properties property_list_len <u8 name_len> name
//!            property* node* null_record
//! ```
//!
//! The three header integers are `u32` before version 7500 and `u64` from
//! 7500 on. A null record is a node header of all zeros.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use super::document::{FbxDocument, FbxNode, Property};
use crate::errors::FbxError;

pub const MAGIC: &[u8; 21] = b"Kaydara FBX Binary  \0";
const HEADER_LEN: usize = 27;

pub const MIN_VERSION: u32 = 7100;
pub const MAX_VERSION: u32 = 7700;
/// First version with 64-bit node headers.
const WIDE_HEADER_VERSION: u32 = 7500;
/// Upper bound on buffer space reserved from untrusted array headers.
const MAX_PREALLOCATION: usize = 16 << 20;

/// Bounds-checked little-endian cursor over the file bytes.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], FbxError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(FbxError::UnexpectedEof(self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, FbxError> {
        Ok(self.bytes(1)?[0])
    }

    fn i16(&mut self) -> Result<i16, FbxError> {
        Ok(LittleEndian::read_i16(self.bytes(2)?))
    }

    fn u32(&mut self) -> Result<u32, FbxError> {
        Ok(LittleEndian::read_u32(self.bytes(4)?))
    }

    fn i32(&mut self) -> Result<i32, FbxError> {
        Ok(LittleEndian::read_i32(self.bytes(4)?))
    }

    fn i64(&mut self) -> Result<i64, FbxError> {
        Ok(LittleEndian::read_i64(self.bytes(8)?))
    }

    fn u64(&mut self) -> Result<u64, FbxError> {
        Ok(LittleEndian::read_u64(self.bytes(8)?))
    }

    fn f32(&mut self) -> Result<f32, FbxError> {
        Ok(LittleEndian::read_f32(self.bytes(4)?))
    }

    fn f64(&mut self) -> Result<f64, FbxError> {
        Ok(LittleEndian::read_f64(self.bytes(8)?))
    }

    fn header_int(&mut self, wide: bool) -> Result<usize, FbxError> {
        let at = self.pos;
        let value = if wide { self.u64()? } else { u64::from(self.u32()?) };
        usize::try_from(value).map_err(|_| FbxError::BadNodeBounds(at))
    }
}

/// Returns `true` when `data` looks like a text FBX file.
fn looks_like_ascii(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start();
    trimmed.starts_with("; FBX") || trimmed.starts_with("FBXHeaderExtension")
}

/// Decodes a binary FBX file into its node tree.
pub fn parse(data: &[u8]) -> Result<FbxDocument, FbxError> {
    if data.len() < HEADER_LEN || &data[..MAGIC.len()] != MAGIC {
        if looks_like_ascii(data) {
            return Err(FbxError::AsciiUnsupported);
        }
        return Err(FbxError::BadMagic);
    }

    let version = LittleEndian::read_u32(&data[23..HEADER_LEN]);
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(FbxError::UnsupportedVersion(version));
    }
    let wide = version >= WIDE_HEADER_VERSION;

    let mut reader = ByteReader::new(data, HEADER_LEN);
    let mut nodes = Vec::new();
    while let Some(node) = read_node(&mut reader, wide)? {
        nodes.push(node);
    }

    log::debug!("Parsed FBX {version} with {} top-level records", nodes.len());
    Ok(FbxDocument { version, nodes })
}

fn read_node(reader: &mut ByteReader<'_>, wide: bool) -> Result<Option<FbxNode>, FbxError> {
    let start = reader.pos;
    let end_offset = reader.header_int(wide)?;
    let num_properties = reader.header_int(wide)?;
    let property_list_len = reader.header_int(wide)?;
    let name_len = usize::from(reader.u8()?);

    if end_offset == 0 && num_properties == 0 && property_list_len == 0 && name_len == 0 {
        return Ok(None);
    }
    if end_offset <= start || end_offset > reader.data.len() {
        return Err(FbxError::BadNodeBounds(start));
    }

    let name = String::from_utf8_lossy(reader.bytes(name_len)?).into_owned();

    let properties_start = reader.pos;
    let mut properties = Vec::with_capacity(num_properties.min(64));
    for _ in 0..num_properties {
        properties.push(read_property(reader)?);
    }
    let properties_end = properties_start
        .checked_add(property_list_len)
        .ok_or(FbxError::BadNodeBounds(start))?;
    if reader.pos != properties_end {
        return Err(FbxError::MalformedNode {
            node: name,
            reason: format!(
                "property list is {} bytes, header says {property_list_len}",
                reader.pos - properties_start
            ),
        });
    }
    if properties_end > end_offset {
        return Err(FbxError::BadNodeBounds(start));
    }

    let mut children = Vec::new();
    while reader.pos < end_offset {
        match read_node(reader, wide)? {
            Some(child) => children.push(child),
            None => break,
        }
    }
    if reader.pos > end_offset {
        return Err(FbxError::BadNodeBounds(start));
    }
    reader.pos = end_offset;

    Ok(Some(FbxNode {
        name,
        properties,
        children,
    }))
}

fn read_property(reader: &mut ByteReader<'_>) -> Result<Property, FbxError> {
    let offset = reader.pos;
    let code = reader.u8()?;
    let property = match code {
        b'Y' => Property::I16(reader.i16()?),
        b'C' => Property::Bool(reader.u8()? & 1 != 0),
        b'I' => Property::I32(reader.i32()?),
        b'F' => Property::F32(reader.f32()?),
        b'D' => Property::F64(reader.f64()?),
        b'L' => Property::I64(reader.i64()?),
        b'f' => {
            let bytes = read_array(reader, 4)?;
            let mut out = vec![0.0_f32; bytes.len() / 4];
            LittleEndian::read_f32_into(&bytes, &mut out);
            Property::F32Array(out)
        }
        b'd' => {
            let bytes = read_array(reader, 8)?;
            let mut out = vec![0.0_f64; bytes.len() / 8];
            LittleEndian::read_f64_into(&bytes, &mut out);
            Property::F64Array(out)
        }
        b'l' => {
            let bytes = read_array(reader, 8)?;
            let mut out = vec![0_i64; bytes.len() / 8];
            LittleEndian::read_i64_into(&bytes, &mut out);
            Property::I64Array(out)
        }
        b'i' => {
            let bytes = read_array(reader, 4)?;
            let mut out = vec![0_i32; bytes.len() / 4];
            LittleEndian::read_i32_into(&bytes, &mut out);
            Property::I32Array(out)
        }
        b'b' => {
            let bytes = read_array(reader, 1)?;
            Property::BoolArray(bytes.iter().map(|b| b & 1 != 0).collect())
        }
        b'S' => {
            let len = reader.u32()? as usize;
            Property::String(String::from_utf8_lossy(reader.bytes(len)?).into_owned())
        }
        b'R' => {
            let len = reader.u32()? as usize;
            Property::Raw(reader.bytes(len)?.to_vec())
        }
        other => {
            return Err(FbxError::UnknownPropertyType {
                code: char::from(other),
                offset,
            });
        }
    };
    Ok(property)
}

/// Reads an array payload and returns its raw little-endian element bytes.
fn read_array(reader: &mut ByteReader<'_>, element_size: usize) -> Result<Vec<u8>, FbxError> {
    let count = reader.u32()? as usize;
    let encoding = reader.u32()?;
    let stored_len = reader.u32()? as usize;

    let expected = count
        .checked_mul(element_size)
        .ok_or(FbxError::ArrayLength {
            expected: usize::MAX,
            actual: stored_len,
        })?;
    let stored = reader.bytes(stored_len)?;

    let bytes = match encoding {
        0 => stored.to_vec(),
        1 => {
            let mut out = Vec::with_capacity(expected.min(MAX_PREALLOCATION));
            ZlibDecoder::new(stored)
                .take(expected as u64 + 1)
                .read_to_end(&mut out)
                .map_err(FbxError::Inflate)?;
            out
        }
        other => return Err(FbxError::UnknownArrayEncoding(other)),
    };

    if bytes.len() != expected {
        return Err(FbxError::ArrayLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(version: u32) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[0x1A, 0x00]);
        out.extend_from_slice(&version.to_le_bytes());
        out
    }

    #[test]
    fn rejects_ascii_files() {
        let text = b"; FBX 7.4.0 project file\nFBXHeaderExtension:  {\n}";
        assert!(matches!(parse(text), Err(FbxError::AsciiUnsupported)));
    }

    #[test]
    fn rejects_old_versions() {
        let mut data = header(6100);
        data.extend_from_slice(&[0; 13]);
        assert!(matches!(parse(&data), Err(FbxError::UnsupportedVersion(6100))));
    }

    #[test]
    fn empty_document_parses() {
        let mut data = header(7400);
        data.extend_from_slice(&[0; 13]);
        let doc = parse(&data).unwrap();
        assert_eq!(doc.version, 7400);
        assert!(doc.nodes.is_empty());
    }

    #[test]
    fn truncated_node_is_eof() {
        let mut data = header(7400);
        data.extend_from_slice(&[1, 0, 0]);
        assert!(matches!(parse(&data), Err(FbxError::UnexpectedEof(_))));
    }
}
