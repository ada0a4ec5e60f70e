// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 record framing.
//!
//! Every record is `len4 | header | len4 | data`; the header is a dictionary
//! of `len4 | key=value` entries where the first NUL-free `=` separates key
//! and value. The `op` field tags the record type.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::core::error::{BagError, Result};

/// Message data record.
pub const OP_MSGDATA: u8 = 0x02;
/// Bag header record.
pub const OP_BAGHEADER: u8 = 0x03;
/// Index data record.
pub const OP_IDXDATA: u8 = 0x04;
/// Chunk record.
pub const OP_CHUNK: u8 = 0x05;
/// Chunk info record.
pub const OP_CHUNK_INFO: u8 = 0x06;
/// Connection record.
pub const OP_CONNECTION: u8 = 0x07;

/// Nanoseconds per second, for the sec/nsec time fields.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A record header dictionary. Field order is preserved on write.
#[derive(Debug, Default, Clone)]
pub struct RecordHeader {
    fields: Vec<(String, Vec<u8>)>,
}

impl RecordHeader {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a length-prefixed header from the source.
    pub fn read<R: Read>(src: &mut R) -> Result<Self> {
        let length = src
            .read_u32::<LittleEndian>()
            .map_err(|e| BagError::corrupt("record header", e.to_string()))?;
        let mut binary = vec![0u8; length as usize];
        src.read_exact(&mut binary)
            .map_err(|e| BagError::corrupt("record header", e.to_string()))?;

        let mut header = Self::new();
        let mut pos = 0usize;
        while pos < binary.len() {
            if pos + 4 > binary.len() {
                return Err(BagError::corrupt(
                    "record header",
                    "field size could not be read",
                ));
            }
            let size = u32::from_le_bytes([
                binary[pos],
                binary[pos + 1],
                binary[pos + 2],
                binary[pos + 3],
            ]) as usize;
            pos += 4;
            if pos + size > binary.len() {
                return Err(BagError::corrupt(
                    "record header",
                    "declared field size is too large",
                ));
            }
            let entry = &binary[pos..pos + size];
            let sep = entry.iter().position(|&b| b == b'=').ok_or_else(|| {
                BagError::corrupt("record header", "field is missing separator")
            })?;
            let name = String::from_utf8_lossy(&entry[..sep]).into_owned();
            header.fields.push((name, entry[sep + 1..].to_vec()));
            pos += size;
        }
        Ok(header)
    }

    /// Read a header and verify its `op` field.
    pub fn read_expect<R: Read>(src: &mut R, op: u8) -> Result<Self> {
        let header = Self::read(src)?;
        let have = header.get_u8("op")?;
        if have != op {
            return Err(BagError::corrupt(
                "record header",
                format!("record op {have:#04x} where {op:#04x} was expected"),
            ));
        }
        Ok(header)
    }

    /// Write the header with its length prefix; returns bytes written.
    pub fn write<W: Write>(&self, dst: &mut W, opcode: Option<u8>) -> Result<usize> {
        let mut data = Vec::new();
        if let Some(op) = opcode {
            let entry = [b"op=" as &[u8], &[op]].concat();
            data.write_u32::<LittleEndian>(entry.len() as u32)?;
            data.extend_from_slice(&entry);
        }
        for (name, value) in &self.fields {
            let mut entry = name.clone().into_bytes();
            entry.push(b'=');
            entry.extend_from_slice(value);
            data.write_u32::<LittleEndian>(entry.len() as u32)?;
            data.extend_from_slice(&entry);
        }
        dst.write_u32::<LittleEndian>(data.len() as u32)?;
        dst.write_all(&data)?;
        Ok(data.len() + 4)
    }

    fn raw(&self, name: &str) -> Result<&[u8]> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| {
                BagError::corrupt("record header", format!("field {name:?} is missing"))
            })
    }

    /// Whether a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Get a u8 field.
    pub fn get_u8(&self, name: &str) -> Result<u8> {
        let raw = self.raw(name)?;
        match raw {
            [value] => Ok(*value),
            _ => Err(BagError::corrupt(
                "record header",
                format!("field {name:?} is not a u8"),
            )),
        }
    }

    /// Get a u32 field.
    pub fn get_u32(&self, name: &str) -> Result<u32> {
        let raw = self.raw(name)?;
        raw.try_into()
            .map(u32::from_le_bytes)
            .map_err(|_| BagError::corrupt("record header", format!("field {name:?} is not a u32")))
    }

    /// Get a u64 field.
    pub fn get_u64(&self, name: &str) -> Result<u64> {
        let raw = self.raw(name)?;
        raw.try_into()
            .map(u64::from_le_bytes)
            .map_err(|_| BagError::corrupt("record header", format!("field {name:?} is not a u64")))
    }

    /// Get a string field.
    pub fn get_string(&self, name: &str) -> Result<String> {
        Ok(String::from_utf8_lossy(self.raw(name)?).into_owned())
    }

    /// Get a sec/nsec time field as nanoseconds.
    pub fn get_time(&self, name: &str) -> Result<u64> {
        let raw = self.raw(name)?;
        if raw.len() != 8 {
            return Err(BagError::corrupt(
                "record header",
                format!("field {name:?} is not a time"),
            ));
        }
        let sec = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as u64;
        let nsec = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]) as u64;
        Ok(sec * NANOS_PER_SEC + nsec)
    }

    /// Set a u32 field.
    pub fn set_u32(&mut self, name: &str, value: u32) {
        self.fields
            .push((name.to_string(), value.to_le_bytes().to_vec()));
    }

    /// Set a u64 field.
    pub fn set_u64(&mut self, name: &str, value: u64) {
        self.fields
            .push((name.to_string(), value.to_le_bytes().to_vec()));
    }

    /// Set a string field.
    pub fn set_string(&mut self, name: &str, value: &str) {
        self.fields
            .push((name.to_string(), value.as_bytes().to_vec()));
    }

    /// Set a sec/nsec time field from nanoseconds.
    pub fn set_time(&mut self, name: &str, nanos: u64) {
        let mut raw = Vec::with_capacity(8);
        raw.extend_from_slice(&((nanos / NANOS_PER_SEC) as u32).to_le_bytes());
        raw.extend_from_slice(&((nanos % NANOS_PER_SEC) as u32).to_le_bytes());
        self.fields.push((name.to_string(), raw));
    }
}

/// Read a little-endian u32 length or value from a source.
pub fn read_u32<R: Read>(src: &mut R) -> Result<u32> {
    src.read_u32::<LittleEndian>()
        .map_err(|e| BagError::corrupt("record", e.to_string()))
}

/// Read exactly `size` bytes from a source.
pub fn read_bytes<R: Read>(src: &mut R, size: usize) -> Result<Vec<u8>> {
    let mut data = vec![0u8; size];
    src.read_exact(&mut data)
        .map_err(|e| BagError::corrupt("record", e.to_string()))?;
    Ok(data)
}
