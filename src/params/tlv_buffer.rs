// Copyright 2022, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The TLV (tag-length-value) codec shared by all protocol encoders and decoders.
//!
//! A record on the wire is `tag:u8, length:u8, value:bytes[length]`, concatenated with no
//! padding. Multi-byte scalars default to little-endian; a builder/parser pair can be switched
//! to big-endian for the generic-purpose blobs that require it.

use std::collections::HashMap;

use bytes::{BufMut, Bytes, BytesMut};
use log::error;

use crate::error::{Error, Result};

/// Byte order applied to multi-byte scalar records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    /// Least significant byte first (the app-config convention).
    Little,
    /// Most significant byte first.
    Big,
}

/// Accumulates TLV records through typed put operations.
///
/// The builder is infallible; a value longer than the 1-byte length field can express is a
/// programming error and panics.
pub struct TlvBufferBuilder {
    buf: BytesMut,
    record_count: usize,
    endianness: Endianness,
}

impl TlvBufferBuilder {
    /// Create a builder writing scalars in little-endian order.
    pub fn new() -> Self {
        Self::with_endianness(Endianness::Little)
    }

    /// Create a builder writing scalars in the given byte order.
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self { buf: BytesMut::new(), record_count: 0, endianness }
    }

    pub fn put_u8(&mut self, tag: u8, value: u8) -> &mut Self {
        self.put_bytes(tag, &[value])
    }

    pub fn put_u16(&mut self, tag: u8, value: u16) -> &mut Self {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_bytes(tag, &bytes)
    }

    pub fn put_u32(&mut self, tag: u8, value: u32) -> &mut Self {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_bytes(tag, &bytes)
    }

    pub fn put_u64(&mut self, tag: u8, value: u64) -> &mut Self {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.put_bytes(tag, &bytes)
    }

    /// Write the value bytes verbatim.
    pub fn put_bytes(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        assert!(
            value.len() <= u8::MAX as usize,
            "TLV value for tag {:#04x} exceeds the 1-byte length field",
            tag
        );
        self.buf.put_u8(tag);
        self.buf.put_u8(value.len() as u8);
        self.buf.extend_from_slice(value);
        self.record_count += 1;
        self
    }

    /// Write the value bytes in reverse order (the device/vendor address convention).
    pub fn put_bytes_reversed(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        let mut reversed = value.to_vec();
        reversed.reverse();
        self.put_bytes(tag, &reversed)
    }

    /// Snapshot the accumulated records into an immutable buffer.
    pub fn build(&self) -> TlvBuffer {
        TlvBuffer {
            bytes: Bytes::copy_from_slice(&self.buf),
            record_count: self.record_count,
        }
    }
}

impl Default for TlvBufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable TLV stream: the concatenated record bytes plus the number of records, which
/// travels alongside the bytes on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlvBuffer {
    bytes: Bytes,
    record_count: usize,
}

impl TlvBuffer {
    /// Wrap raw record bytes received from the transport together with their advertised count.
    pub fn from_raw(bytes: Vec<u8>, record_count: usize) -> Self {
        Self { bytes: bytes.into(), record_count }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// A parsed tag → value map over a TLV stream.
///
/// `parse()` fails on truncation and when the parsed record count differs from the externally
/// supplied expected count; a failed parse exposes no partial map. Duplicate tags within one
/// stream resolve last-wins.
pub struct TlvMap {
    records: HashMap<u8, Vec<u8>>,
    parsed_count: usize,
    endianness: Endianness,
}

impl TlvMap {
    /// Parse a little-endian TLV stream.
    pub fn parse(bytes: &[u8], expected_count: usize) -> Result<Self> {
        Self::parse_with_endianness(bytes, expected_count, Endianness::Little)
    }

    /// Parse a TLV stream whose scalars use the given byte order.
    pub fn parse_with_endianness(
        bytes: &[u8],
        expected_count: usize,
        endianness: Endianness,
    ) -> Result<Self> {
        let mut records = HashMap::new();
        let mut parsed_count = 0;
        let mut ptr = 0;
        while ptr < bytes.len() {
            if bytes.len() - ptr < 2 {
                error!("Truncated TLV header at offset {}", ptr);
                return Err(Error::BadParameters);
            }
            let tag = bytes[ptr];
            let length = bytes[ptr + 1] as usize;
            ptr += 2;
            if bytes.len() - ptr < length {
                error!(
                    "TLV tag {:#04x} declares length {} but only {} bytes remain",
                    tag,
                    length,
                    bytes.len() - ptr
                );
                return Err(Error::BadParameters);
            }
            // Last record wins on duplicate tags.
            records.insert(tag, bytes[ptr..ptr + length].to_vec());
            ptr += length;
            parsed_count += 1;
        }
        if parsed_count != expected_count {
            error!("Parsed {} TLV records but expected {}", parsed_count, expected_count);
            return Err(Error::BadParameters);
        }
        Ok(Self { records, parsed_count, endianness })
    }

    /// The number of records consumed by the parse, counting duplicates individually.
    pub fn record_count(&self) -> usize {
        self.parsed_count
    }

    pub fn get_u8(&self, tag: u8) -> Result<u8> {
        Ok(self.get_sized(tag, 1)?[0])
    }

    pub fn get_u16(&self, tag: u8) -> Result<u16> {
        Ok(self.scalar(self.get_sized(tag, 2)?) as u16)
    }

    pub fn get_u32(&self, tag: u8) -> Result<u32> {
        Ok(self.scalar(self.get_sized(tag, 4)?) as u32)
    }

    pub fn get_u64(&self, tag: u8) -> Result<u64> {
        Ok(self.scalar(self.get_sized(tag, 8)?))
    }

    /// The raw value bytes of the tag, any length.
    pub fn get_bytes(&self, tag: u8) -> Result<&[u8]> {
        match self.records.get(&tag) {
            Some(value) => Ok(value),
            None => {
                error!("TLV tag {:#04x} is not present", tag);
                Err(Error::BadParameters)
            }
        }
    }

    /// The value bytes of the tag in reverse order (undoes `put_bytes_reversed`).
    pub fn get_bytes_reversed(&self, tag: u8) -> Result<Vec<u8>> {
        let mut value = self.get_bytes(tag)?.to_vec();
        value.reverse();
        Ok(value)
    }

    pub fn get_optional_u8(&self, tag: u8) -> Result<Option<u8>> {
        if !self.records.contains_key(&tag) {
            return Ok(None);
        }
        self.get_u8(tag).map(Some)
    }

    pub fn get_optional_u16(&self, tag: u8) -> Result<Option<u16>> {
        if !self.records.contains_key(&tag) {
            return Ok(None);
        }
        self.get_u16(tag).map(Some)
    }

    pub fn get_optional_u32(&self, tag: u8) -> Result<Option<u32>> {
        if !self.records.contains_key(&tag) {
            return Ok(None);
        }
        self.get_u32(tag).map(Some)
    }

    pub fn get_optional_bytes(&self, tag: u8) -> Option<&[u8]> {
        self.records.get(&tag).map(|value| value.as_slice())
    }

    fn get_sized(&self, tag: u8, width: usize) -> Result<&[u8]> {
        match self.records.get(&tag) {
            Some(value) if value.len() == width => Ok(value),
            Some(value) => {
                error!(
                    "TLV tag {:#04x} stores {} bytes, expected a {}-byte scalar",
                    tag,
                    value.len(),
                    width
                );
                Err(Error::BadParameters)
            }
            None => {
                error!("TLV tag {:#04x} is not present", tag);
                Err(Error::BadParameters)
            }
        }
    }

    fn scalar(&self, value: &[u8]) -> u64 {
        let fold = |acc: u64, byte: &u8| (acc << 8) | (*byte as u64);
        match self.endianness {
            Endianness::Little => value.iter().rev().fold(0, fold),
            Endianness::Big => value.iter().fold(0, fold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_then_parse_round_trip() {
        let buffer = TlvBufferBuilder::new()
            .put_u8(0x04, 9)
            .put_u16(0x08, 0x0960)
            .put_u32(0x09, 0x12345678)
            .put_u64(0x0A, 0x0123456789ABCDEF)
            .put_bytes(0x06, &[0x0A, 0x0B])
            .build();
        assert_eq!(buffer.record_count(), 5);

        let map = TlvMap::parse(buffer.bytes(), buffer.record_count()).unwrap();
        assert_eq!(map.record_count(), 5);
        assert_eq!(map.get_u8(0x04).unwrap(), 9);
        assert_eq!(map.get_u16(0x08).unwrap(), 0x0960);
        assert_eq!(map.get_u32(0x09).unwrap(), 0x12345678);
        assert_eq!(map.get_u64(0x0A).unwrap(), 0x0123456789ABCDEF);
        assert_eq!(map.get_bytes(0x06).unwrap(), &[0x0A, 0x0B]);
    }

    #[test]
    fn test_scalars_are_little_endian_by_default() {
        let buffer = TlvBufferBuilder::new().put_u16(0x25, 0x1357).build();
        assert_eq!(buffer.bytes(), &[0x25, 0x02, 0x57, 0x13]);
    }

    #[test]
    fn test_big_endian_mode() {
        let buffer =
            TlvBufferBuilder::with_endianness(Endianness::Big).put_u32(0x01, 0x12345678).build();
        assert_eq!(buffer.bytes(), &[0x01, 0x04, 0x12, 0x34, 0x56, 0x78]);

        let map =
            TlvMap::parse_with_endianness(buffer.bytes(), buffer.record_count(), Endianness::Big)
                .unwrap();
        assert_eq!(map.get_u32(0x01).unwrap(), 0x12345678);
    }

    #[test]
    fn test_put_bytes_reversed() {
        let buffer = TlvBufferBuilder::new().put_bytes_reversed(0x06, &[0x12, 0x34]).build();
        assert_eq!(buffer.bytes(), &[0x06, 0x02, 0x34, 0x12]);

        let map = TlvMap::parse(buffer.bytes(), 1).unwrap();
        assert_eq!(map.get_bytes_reversed(0x06).unwrap(), vec![0x12, 0x34]);
    }

    #[test]
    fn test_parse_zero_length_value() {
        let map = TlvMap::parse(&[0x30, 0x00], 1).unwrap();
        assert_eq!(map.get_bytes(0x30).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_parse_truncated_value_fails() {
        // Tag 0x09 declares 4 bytes but only 2 remain.
        assert!(TlvMap::parse(&[0x09, 0x04, 0x60, 0x09], 1).is_err());
    }

    #[test]
    fn test_parse_truncated_header_fails() {
        assert!(TlvMap::parse(&[0x04, 0x01, 0x09, 0x08], 2).is_err());
    }

    #[test]
    fn test_parse_count_mismatch_fails() {
        let buffer = TlvBufferBuilder::new().put_u8(0x04, 9).put_u8(0x11, 0).build();
        assert!(TlvMap::parse(buffer.bytes(), 1).is_err());
        assert!(TlvMap::parse(buffer.bytes(), 3).is_err());
    }

    #[test]
    fn test_get_absent_tag_fails() {
        let buffer = TlvBufferBuilder::new().put_u8(0x04, 9).build();
        let map = TlvMap::parse(buffer.bytes(), 1).unwrap();
        assert!(map.get_u8(0x11).is_err());
        assert!(map.get_bytes(0x11).is_err());
    }

    #[test]
    fn test_get_mis_sized_tag_fails() {
        let buffer = TlvBufferBuilder::new().put_u16(0x08, 0x0960).build();
        let map = TlvMap::parse(buffer.bytes(), 1).unwrap();
        assert!(map.get_u8(0x08).is_err());
        assert!(map.get_u32(0x08).is_err());
        assert_eq!(map.get_u16(0x08).unwrap(), 0x0960);
    }

    #[test]
    fn test_optional_getters() {
        let buffer = TlvBufferBuilder::new().put_u16(0x0F, 100).build();
        let map = TlvMap::parse(buffer.bytes(), 1).unwrap();
        assert_eq!(map.get_optional_u16(0x0F).unwrap(), Some(100));
        assert_eq!(map.get_optional_u16(0x10).unwrap(), None);
        assert_eq!(map.get_optional_bytes(0x10), None);
        // A present but mis-sized record is still an error.
        assert!(map.get_optional_u32(0x0F).is_err());
    }

    #[test]
    fn test_duplicate_tag_last_wins() {
        let bytes = [0x04, 0x01, 0x05, 0x04, 0x01, 0x09];
        let map = TlvMap::parse(&bytes, 2).unwrap();
        assert_eq!(map.record_count(), 2);
        assert_eq!(map.get_u8(0x04).unwrap(), 9);
    }

    #[test]
    fn test_parse_empty_stream() {
        let map = TlvMap::parse(&[], 0).unwrap();
        assert_eq!(map.record_count(), 0);
        assert!(TlvMap::parse(&[], 1).is_err());
    }
}
