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

use std::fmt::Display;

use super::MAX_SIZE;
use super::MembershipSketchBuilder;
use crate::codec::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::hash::compute_seed_hash;
use crate::hash::hash_bytes;

const PREAMBLE_LONGS_EMPTY: u8 = 5;
const PREAMBLE_LONGS_STANDARD: u8 = 6;
const SERIAL_VERSION: u8 = 1;
const EMPTY_FLAG_MASK: u8 = 1 << 2;

/// A Bloom-style sketch for probabilistic set membership testing.
///
/// Provides membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - False positives bounded by the configured error rate
/// - Constant space usage
///
/// Use [`MembershipSketch::new`] or [`MembershipSketchBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipSketch {
    /// Base seed; hash round `i` uses `seed + i`
    seed: u32,
    /// Expected number of items (n)
    capacity: u64,
    /// Target false positive probability (p)
    error_rate: f64,
    /// Number of hash rounds (k)
    num_hashes: u32,
    /// Total number of bits in the sketch (m)
    size: u64,
    /// Count of bits set to 1
    num_bits_set: u64,
    /// Bit array packed into u64 words, length = ceil(size / 64)
    bit_array: Vec<u64>,
}

impl MembershipSketch {
    /// Creates an empty sketch sized for `capacity` items at the target `error_rate`.
    ///
    /// Shorthand for [`MembershipSketchBuilder::with_accuracy`] followed by `seed` and `build`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `capacity` is 0 or `error_rate` is not in (0.0, 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::membership::MembershipSketch;
    /// # use rangesketch::error::ErrorKind;
    /// let sketch = MembershipSketch::new(1, 100, 0.01).unwrap();
    /// assert!(sketch.is_empty());
    ///
    /// let err = MembershipSketch::new(1, 100, 1.5).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    /// ```
    pub fn new(seed: u32, capacity: u64, error_rate: f64) -> Result<Self, Error> {
        MembershipSketchBuilder::with_accuracy(capacity, error_rate)
            .seed(seed)
            .build()
    }

    pub(super) fn from_parts(
        seed: u32,
        capacity: u64,
        error_rate: f64,
        size: u64,
        num_hashes: u32,
    ) -> Self {
        let num_words = size.div_ceil(64) as usize;
        MembershipSketch {
            seed,
            capacity,
            error_rate,
            num_hashes,
            size,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words],
        }
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: item was **possibly** inserted (or false positive)
    /// - `false`: item was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::membership::MembershipSketch;
    /// let mut sketch = MembershipSketch::new(0, 100, 0.01).unwrap();
    /// sketch.insert("apple");
    ///
    /// assert!(sketch.contains("apple"));
    /// assert!(!sketch.contains("grape")); // never inserted (probably)
    /// ```
    pub fn contains<T: Display + ?Sized>(&self, item: &T) -> bool {
        if self.is_empty() {
            return false;
        }

        let key = item.to_string();
        (0..self.num_hashes).all(|round| self.get_bit(self.bit_index(key.as_bytes(), round)))
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts an item into the sketch.
    ///
    /// After insertion, `contains(item)` always returns `true`. Inserting the same item again
    /// leaves the bit array unchanged.
    pub fn insert<T: Display + ?Sized>(&mut self, item: &T) {
        let key = item.to_string();
        for round in 0..self.num_hashes {
            let bit_index = self.bit_index(key.as_bytes(), round);
            self.set_bit(bit_index);
        }
    }

    /// Inserts every item of an iterator.
    ///
    /// The final bit array does not depend on the order of the items.
    pub fn insert_all<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        for item in items {
            self.insert(&item);
        }
    }

    /// Resets the sketch to its initial empty state.
    pub fn reset(&mut self) {
        self.bit_array.fill(0);
        self.num_bits_set = 0;
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether the sketch is empty (no items inserted).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the sketch.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the number of hash rounds per item.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the base hash seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the expected number of items the sketch was sized for.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the target false positive probability the sketch was sized for.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Returns the fraction of bits set.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.size as f64
    }

    /// Estimates the current false positive probability.
    ///
    /// A probe is a false positive when all `k` of its bits are set, so the estimate is
    /// `load^k` where `load` is the fraction of bits set. Assumes uniformly distributed bits.
    pub fn estimated_fpp(&self) -> f64 {
        let k = self.num_hashes as f64;
        self.load_factor().powf(k)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serializes the sketch to a byte vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::membership::MembershipSketch;
    /// let mut sketch = MembershipSketch::new(5, 100, 0.01).unwrap();
    /// sketch.insert(&17);
    ///
    /// let bytes = sketch.serialize();
    /// let restored = MembershipSketch::deserialize(&bytes).unwrap();
    /// assert!(restored.contains(&17));
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let preamble_longs = if is_empty {
            PREAMBLE_LONGS_EMPTY
        } else {
            PREAMBLE_LONGS_STANDARD
        };

        let capacity = 8 * preamble_longs as usize
            + if is_empty {
                0
            } else {
                self.bit_array.len() * 8
            };
        let mut bytes = SketchBytes::with_capacity(capacity);

        bytes.write_u8(preamble_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(Family::MEMBERSHIP.id);
        bytes.write_u8(if is_empty { EMPTY_FLAG_MASK } else { 0 });
        bytes.write_u16_le(0); // reserved
        bytes.write_u16_le(compute_seed_hash(self.seed));

        bytes.write_u32_le(self.seed);
        bytes.write_u32_le(self.num_hashes);
        bytes.write_u64_le(self.size);
        bytes.write_u64_le(self.capacity);
        bytes.write_f64_le(self.error_rate);

        if !is_empty {
            bytes.write_u64_le(self.num_bits_set);
            for &word in &self.bit_array {
                bytes.write_u64_le(word);
            }
        }

        bytes.into_bytes()
    }

    /// Deserializes a sketch from bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if:
    /// - The data is truncated or corrupted
    /// - The family ID doesn't match (not a membership sketch)
    /// - The serial version is unsupported
    /// - The stored seed hash doesn't match the stored seed
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

        Family::MEMBERSHIP.validate_id(family_id)?;
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            ));
        }
        Family::MEMBERSHIP.validate_pre_longs(preamble_longs)?;

        let flags = cursor
            .read_u8()
            .map_err(Error::insufficient_data("flags"))?;
        let is_empty = (flags & EMPTY_FLAG_MASK) != 0;
        let expected_preamble_longs = if is_empty {
            PREAMBLE_LONGS_EMPTY
        } else {
            PREAMBLE_LONGS_STANDARD
        };
        if preamble_longs != expected_preamble_longs {
            return Err(Error::deserial("preamble longs disagree with empty flag")
                .with_context("preamble_longs", preamble_longs)
                .with_context("is_empty", is_empty));
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
        if seed_hash != compute_seed_hash(seed) {
            return Err(Error::deserial("incompatible seed hash")
                .with_context("seed", seed)
                .with_context("seed_hash", seed_hash));
        }

        let num_hashes = cursor
            .read_u32_le()
            .map_err(Error::insufficient_data("num_hashes"))?;
        let size = cursor
            .read_u64_le()
            .map_err(Error::insufficient_data("size"))?;
        let capacity = cursor
            .read_u64_le()
            .map_err(Error::insufficient_data("capacity"))?;
        let error_rate = cursor
            .read_f64_le()
            .map_err(Error::insufficient_data("error_rate"))?;

        if size == 0 || size > MAX_SIZE || num_hashes == 0 || capacity == 0 {
            return Err(Error::deserial("sketch parameters out of range")
                .with_context("size", size)
                .with_context("num_hashes", num_hashes)
                .with_context("capacity", capacity));
        }
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(
                Error::deserial("error_rate out of range").with_context("error_rate", error_rate)
            );
        }

        let mut sketch = MembershipSketch::from_parts(seed, capacity, error_rate, size, num_hashes);
        if !is_empty {
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
        }

        Ok(sketch)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Bit position for one hash round: `hash(key, seed + round) mod size`.
    fn bit_index(&self, key: &[u8], round: u32) -> u64 {
        let hash = hash_bytes(key, self.seed.wrapping_add(round));
        u64::from(hash) % self.size
    }

    fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets a single bit and updates the count if it wasn't already set.
    fn set_bit(&mut self, bit_index: u64) {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
        }
    }

    fn recount_bits_set(&mut self) {
        self.num_bits_set = self
            .bit_array
            .iter()
            .map(|word| u64::from(word.count_ones()))
            .sum();
    }
}
