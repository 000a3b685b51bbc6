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

//! Binary layout, all little-endian:
//!
//! ```text
//! long 0: pre_longs u8 | serial_version u8 | family u8 | flags u8 | reserved u16 | seed_hash u16
//! long 1: seed u32 | reserved u32
//! long 2: size u64
//! long 3: num_bits_set u64            (non-empty only)
//! then ceil(size / 64) bit array words (non-empty only)
//! ```

use super::CardinalitySketch;
use super::MAX_SIZE;
use crate::codec::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::hash::compute_seed_hash;

const PREAMBLE_LONGS_EMPTY: u8 = 3;
const PREAMBLE_LONGS_STANDARD: u8 = 4;
const SERIAL_VERSION: u8 = 1;
const FLAGS_IS_EMPTY: u8 = 1 << 0;

impl CardinalitySketch {
    /// Serializes the sketch so a provider can ship it to the aggregator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::cardinality::CardinalitySketch;
    /// let mut sketch = CardinalitySketch::new(4096, 12).unwrap();
    /// sketch.insert_all(["a", "b", "c"]);
    ///
    /// let restored = CardinalitySketch::deserialize(&sketch.serialize()).unwrap();
    /// assert_eq!(restored, sketch);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let preamble_longs = if is_empty {
            PREAMBLE_LONGS_EMPTY
        } else {
            PREAMBLE_LONGS_STANDARD
        };
        let body_words = if is_empty { 0 } else { self.bit_array.len() };

        let mut bytes = SketchBytes::with_capacity(8 * (preamble_longs as usize + body_words));
        bytes.write_u8(preamble_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(Family::CARDINALITY.id);
        bytes.write_u8(if is_empty { FLAGS_IS_EMPTY } else { 0 });
        bytes.write_u16_le(0);
        bytes.write_u16_le(compute_seed_hash(self.seed));
        bytes.write_u32_le(self.seed);
        bytes.write_u32_le(0);
        bytes.write_u64_le(self.size);

        if !is_empty {
            bytes.write_u64_le(self.num_bits_set);
            for &word in &self.bit_array {
                bytes.write_u64_le(word);
            }
        }

        bytes.into_bytes()
    }

    /// Deserializes a sketch produced by [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if the bytes are truncated, belong to another sketch family, use
    /// an unsupported serial version, carry a seed hash that does not match the seed, or
    /// describe bits beyond `size`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);

        let preamble_longs = cursor
            .read_u8()
            .map_err(Error::insufficient_data("preamble_longs"))?;
        let serial_version = cursor
            .read_u8()
            .map_err(Error::insufficient_data("serial_version"))?;
        let family_id = cursor
            .read_u8()
            .map_err(Error::insufficient_data("family_id"))?;
        let flags = cursor
            .read_u8()
            .map_err(Error::insufficient_data("flags"))?;

        Family::CARDINALITY.validate_id(family_id)?;
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            ));
        }
        Family::CARDINALITY.validate_pre_longs(preamble_longs)?;

        let is_empty = (flags & FLAGS_IS_EMPTY) != 0;
        if is_empty != (preamble_longs == PREAMBLE_LONGS_EMPTY) {
            return Err(Error::deserial("preamble longs disagree with empty flag")
                .with_context("preamble_longs", preamble_longs)
                .with_context("flags", flags));
        }

        cursor
            .read_u16_le()
            .map_err(Error::insufficient_data("reserved"))?;
        let seed_hash = cursor
            .read_u16_le()
            .map_err(Error::insufficient_data("seed_hash"))?;
        let seed = cursor
            .read_u32_le()
            .map_err(Error::insufficient_data("seed"))?;
        cursor
            .read_u32_le()
            .map_err(Error::insufficient_data("reserved"))?;
        if seed_hash != compute_seed_hash(seed) {
            return Err(Error::deserial("incompatible seed hash")
                .with_context("seed", seed)
                .with_context("seed_hash", seed_hash));
        }

        let size = cursor
            .read_u64_le()
            .map_err(Error::insufficient_data("size"))?;
        if size == 0 || size > MAX_SIZE {
            return Err(Error::deserial("size out of range").with_context("size", size));
        }

        let mut sketch = CardinalitySketch::with_size_unchecked(size, seed);
        if is_empty {
            return Ok(sketch);
        }

        let num_bits_set = cursor
            .read_u64_le()
            .map_err(Error::insufficient_data("num_bits_set"))?;
        cursor
            .read_u64_words(&mut sketch.bit_array)
            .map_err(Error::insufficient_data("bit_array"))?;

        let excess_bits = size % 64;
        if excess_bits != 0 {
            let last = sketch.bit_array[sketch.bit_array.len() - 1];
            if last >> excess_bits != 0 {
                return Err(Error::deserial("bits set beyond sketch size")
                    .with_context("size", size));
            }
        }

        sketch.recount_bits_set();
        if sketch.num_bits_set != num_bits_set {
            return Err(Error::deserial("bit count does not match bit array")
                .with_context("expected", num_bits_set)
                .with_context("actual", sketch.num_bits_set));
        }

        Ok(sketch)
    }
}
