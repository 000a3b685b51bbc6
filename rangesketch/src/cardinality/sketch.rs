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
use crate::error::Error;
use crate::hash::hash;

/// Linear counting sketch.
///
/// See the [module level documentation](super) for more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalitySketch {
    pub(super) seed: u32,
    pub(super) size: u64,
    pub(super) num_bits_set: u64,
    pub(super) bit_array: Vec<u64>,
}

impl CardinalitySketch {
    /// Creates an empty sketch with `size` bits hashing under `seed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `size` is 0 or exceeds the supported maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::cardinality::CardinalitySketch;
    /// let sketch = CardinalitySketch::new(1024, 0).unwrap();
    /// assert_eq!(sketch.estimate(), 0);
    /// assert!(CardinalitySketch::new(0, 0).is_err());
    /// ```
    pub fn new(size: u64, seed: u32) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::invalid_parameter("size must be greater than 0")
                .with_context("size", size));
        }
        if size > MAX_SIZE {
            return Err(
                Error::invalid_parameter(format!("size must not exceed {MAX_SIZE} bits"))
                    .with_context("size", size),
            );
        }
        Ok(Self::with_size_unchecked(size, seed))
    }

    pub(super) fn with_size_unchecked(size: u64, seed: u32) -> Self {
        let num_words = size.div_ceil(64) as usize;
        CardinalitySketch {
            seed,
            size,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words],
        }
    }

    /// Inserts an item, setting bit `hash(item, seed) mod size`.
    ///
    /// Inserting the same item twice is a no-op the second time.
    pub fn insert<T: Display + ?Sized>(&mut self, item: &T) {
        let bit_index = u64::from(hash(item, self.seed)) % self.size;
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
        }
    }

    /// Inserts every item of an iterator.
    pub fn insert_all<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        for item in items {
            self.insert(&item);
        }
    }

    /// Estimates the number of distinct items inserted.
    ///
    /// Returns `floor(-size * ln(V / size))` where `V` is the number of zero bits. When no bit
    /// is left at zero the sketch is saturated and `size` is returned; that value is only an
    /// upper bound of what the sketch can express, not an estimate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::cardinality::CardinalitySketch;
    /// let mut sketch = CardinalitySketch::new(8, 0).unwrap();
    /// sketch.insert_all(0..1000);
    /// assert!(sketch.is_saturated());
    /// assert_eq!(sketch.estimate(), 8);
    /// ```
    pub fn estimate(&self) -> u64 {
        let zeros = self.num_zero_bits();
        if zeros == 0 {
            return self.size;
        }

        let m = self.size as f64;
        let v = zeros as f64;
        (-m * (v / m).ln()).floor() as u64
    }

    /// Returns whether two sketches may be merged: same size and same seed.
    pub fn is_compatible(&self, other: &CardinalitySketch) -> bool {
        self.size == other.size && self.seed == other.seed
    }

    /// Returns the union of two sketches as a new sketch.
    ///
    /// The merge is commutative, associative and idempotent.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleSketch` if the sketches differ in size or seed.
    pub fn merge(&self, other: &CardinalitySketch) -> Result<CardinalitySketch, Error> {
        let mut merged = self.clone();
        merged.union(other)?;
        Ok(merged)
    }

    /// Merges another sketch into this one via bitwise OR.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleSketch` if the sketches differ in size or seed; `self` is left
    /// unchanged in that case.
    pub fn union(&mut self, other: &CardinalitySketch) -> Result<(), Error> {
        if !self.is_compatible(other) {
            return Err(Error::incompatible_sketch(
                "cannot merge sketches with different size or seed",
            )
            .with_context("size", self.size)
            .with_context("other_size", other.size)
            .with_context("seed", self.seed)
            .with_context("other_seed", other.seed));
        }

        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word |= *other_word;
        }
        self.recount_bits_set();
        Ok(())
    }

    /// Resets the sketch to its initial empty state.
    pub fn reset(&mut self) {
        self.bit_array.fill(0);
        self.num_bits_set = 0;
    }

    /// Returns whether no item has been inserted.
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns whether every bit is set.
    pub fn is_saturated(&self) -> bool {
        self.num_bits_set == self.size
    }

    /// Returns the number of bits still at zero (`V`).
    pub fn num_zero_bits(&self) -> u64 {
        self.size - self.num_bits_set
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the fraction of bits set.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.size as f64
    }

    /// Returns the total number of bits.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub(super) fn recount_bits_set(&mut self) {
        self.num_bits_set = self
            .bit_array
            .iter()
            .map(|word| u64::from(word.count_ones()))
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_empty() {
        let sketch = CardinalitySketch::new(100, 3).unwrap();
        assert!(sketch.is_empty());
        assert!(!sketch.is_saturated());
        assert_eq!(sketch.num_zero_bits(), 100);
        assert_eq!(sketch.estimate(), 0);
    }

    #[test]
    fn test_invalid_size() {
        let err = CardinalitySketch::new(0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err = CardinalitySketch::new(MAX_SIZE + 1, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_single_item() {
        let mut sketch = CardinalitySketch::new(8192, 0).unwrap();
        sketch.insert("car-1");
        assert_eq!(sketch.bits_used(), 1);
        // floor(-8192 * ln(8191 / 8192)) = floor(1.00006)
        assert_eq!(sketch.estimate(), 1);
    }

    #[test]
    fn test_size_not_multiple_of_64() {
        let mut sketch = CardinalitySketch::new(100, 11).unwrap();
        sketch.insert_all(0..10_000);
        assert!(sketch.is_saturated());
        assert_eq!(sketch.bits_used(), 100);
        assert_eq!(sketch.estimate(), 100);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut once = CardinalitySketch::new(256, 5).unwrap();
        once.insert(&"id-9");

        let mut twice = CardinalitySketch::new(256, 5).unwrap();
        twice.insert(&"id-9");
        twice.insert(&"id-9");

        assert_eq!(once, twice);
    }

    #[test]
    fn test_union_in_place() {
        let mut a = CardinalitySketch::new(1024, 1).unwrap();
        let mut b = CardinalitySketch::new(1024, 1).unwrap();
        a.insert_all(0..10);
        b.insert_all(5..15);

        let mut expected = CardinalitySketch::new(1024, 1).unwrap();
        expected.insert_all(0..15);

        a.union(&b).unwrap();
        assert_eq!(a, expected);
    }

    #[test]
    fn test_union_incompatible_leaves_self_unchanged() {
        let mut a = CardinalitySketch::new(1024, 1).unwrap();
        a.insert("x");
        let before = a.clone();

        let b = CardinalitySketch::new(1024, 2).unwrap();
        let err = a.union(&b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleSketch);
        assert_eq!(a, before);

        let c = CardinalitySketch::new(2048, 1).unwrap();
        assert!(!a.is_compatible(&c));
        assert_eq!(a.merge(&c).unwrap_err().kind(), ErrorKind::IncompatibleSketch);
    }

    #[test]
    fn test_reset() {
        let mut sketch = CardinalitySketch::new(64, 0).unwrap();
        sketch.insert_all(0..20);
        sketch.reset();
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(), 0);
    }
}
