// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Byte-level encoding shared by the sketch serializers.
//!
//! All multi-byte values are little-endian.

mod family;

pub(crate) use self::family::Family;

use std::io;
use std::io::Cursor;

use byteorder::LE;
use byteorder::ReadBytesExt;

/// Growable output buffer for a serialized sketch.
pub(crate) struct SketchBytes {
    bytes: Vec<u8>,
}

impl SketchBytes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    pub fn write_u8(&mut self, n: u8) {
        self.bytes.push(n);
    }

    pub fn write_u16_le(&mut self, n: u16) {
        self.write(&n.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, n: u32) {
        self.write(&n.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, n: u64) {
        self.write(&n.to_le_bytes());
    }

    pub fn write_f64_le(&mut self, n: f64) {
        self.write(&n.to_le_bytes());
    }
}

/// Read cursor over a serialized sketch.
pub(crate) struct SketchSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl<'a> SketchSlice<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        SketchSlice {
            slice: Cursor::new(slice),
        }
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.slice.read_u8()
    }

    pub fn read_u16_le(&mut self) -> io::Result<u16> {
        self.slice.read_u16::<LE>()
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        self.slice.read_u32::<LE>()
    }

    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        self.slice.read_u64::<LE>()
    }

    pub fn read_f64_le(&mut self) -> io::Result<f64> {
        self.slice.read_f64::<LE>()
    }

    /// Fills `words` with consecutive little-endian u64 values.
    pub fn read_u64_words(&mut self, words: &mut [u64]) -> io::Result<()> {
        self.slice.read_u64_into::<LE>(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut bytes = SketchBytes::with_capacity(32);
        bytes.write_u8(3);
        bytes.write_u16_le(0xbeef);
        bytes.write_u32_le(9001);
        bytes.write_u64_le(u64::MAX - 1);
        bytes.write_f64_le(0.0001);
        let bytes = bytes.into_bytes();
        assert_eq!(bytes.len(), 1 + 2 + 4 + 8 + 8);
        assert_eq!(&bytes[1..3], &[0xef, 0xbe]);

        let mut slice = SketchSlice::new(&bytes);
        assert_eq!(slice.read_u8().unwrap(), 3);
        assert_eq!(slice.read_u16_le().unwrap(), 0xbeef);
        assert_eq!(slice.read_u32_le().unwrap(), 9001);
        assert_eq!(slice.read_u64_le().unwrap(), u64::MAX - 1);
        assert_eq!(slice.read_f64_le().unwrap(), 0.0001);
        assert!(slice.read_u8().is_err());
    }

    #[test]
    fn test_writes_are_little_endian() {
        let mut bytes = SketchBytes::with_capacity(14);
        bytes.write_u32_le(0x0102_0304);
        bytes.write_u64_le(1);
        bytes.write(&[0xaa, 0xbb]);
        assert_eq!(
            bytes.into_bytes(),
            [4, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0xaa, 0xbb]
        );

        let mut bytes = SketchBytes::with_capacity(8);
        bytes.write_f64_le(-2.5);
        assert_eq!(bytes.into_bytes(), (-2.5f64).to_le_bytes());
    }

    #[test]
    fn test_read_words_truncated() {
        let mut bytes = SketchBytes::with_capacity(16);
        bytes.write_u64_le(1);
        bytes.write_u32_le(2);
        let bytes = bytes.into_bytes();

        let mut words = [0u64; 2];
        let mut slice = SketchSlice::new(&bytes);
        assert!(slice.read_u64_words(&mut words).is_err());
    }
}
