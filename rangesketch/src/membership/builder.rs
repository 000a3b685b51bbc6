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

use super::MAX_SIZE;
use super::MembershipSketch;
use crate::error::Error;

/// Builder for creating [`MembershipSketch`] instances.
///
/// Parameters are validated by [`build()`](Self::build), which reports bad input as
/// [`ErrorKind::InvalidParameter`](crate::error::ErrorKind::InvalidParameter) instead of
/// panicking.
#[derive(Debug, Clone)]
pub struct MembershipSketchBuilder {
    capacity: u64,
    error_rate: f64,
    seed: u32,
}

impl MembershipSketchBuilder {
    /// Creates a builder sized for `capacity` items at the target `error_rate`.
    ///
    /// # Arguments
    ///
    /// - `capacity`: expected number of distinct items, must be positive
    /// - `error_rate`: target false positive probability, must lie in (0.0, 1.0)
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::membership::MembershipSketchBuilder;
    /// let sketch = MembershipSketchBuilder::with_accuracy(1000, 0.01)
    ///     .seed(7)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(sketch.seed(), 7);
    /// ```
    pub fn with_accuracy(capacity: u64, error_rate: f64) -> Self {
        MembershipSketchBuilder {
            capacity,
            error_rate,
            seed: 0,
        }
    }

    /// Sets the base hash seed (default: 0).
    ///
    /// Hash round `i` uses `seed + i`, so two sketches whose seeds differ by less than the
    /// number of hash rounds share some hash functions.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the membership sketch.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `capacity` is 0, if `error_rate` is not in (0.0, 1.0), or
    /// if the derived bit array would exceed the supported maximum.
    pub fn build(self) -> Result<MembershipSketch, Error> {
        if self.capacity == 0 {
            return Err(Error::invalid_parameter("capacity must be greater than 0")
                .with_context("capacity", self.capacity));
        }
        if !(self.error_rate > 0.0 && self.error_rate < 1.0) {
            return Err(Error::invalid_parameter(
                "error_rate must be between 0.0 and 1.0 (exclusive)",
            )
            .with_context("error_rate", self.error_rate));
        }

        let size = Self::suggest_size(self.capacity, self.error_rate);
        if size > MAX_SIZE {
            return Err(Error::invalid_parameter(format!(
                "derived size must not exceed {MAX_SIZE} bits"
            ))
            .with_context("capacity", self.capacity)
            .with_context("error_rate", self.error_rate)
            .with_context("size", size));
        }
        let num_hashes = Self::suggest_num_hashes(self.capacity, size);

        Ok(MembershipSketch::from_parts(
            self.seed,
            self.capacity,
            self.error_rate,
            size,
            num_hashes,
        ))
    }

    /// Suggests the bit array size for a capacity and error rate.
    ///
    /// Formula: `m = ceil(-n * ln(p) / (ln(2)^2))`, at least 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::membership::MembershipSketchBuilder;
    /// assert_eq!(MembershipSketchBuilder::suggest_size(1000, 0.0001), 19171);
    /// ```
    pub fn suggest_size(capacity: u64, error_rate: f64) -> u64 {
        let n = capacity as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let size = (-n * error_rate.ln() / ln2_squared).ceil();
        (size as u64).max(1)
    }

    /// Suggests the number of hash rounds for a capacity and bit array size.
    ///
    /// Formula: `k = floor((m / n) * ln(2))`, at least 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::membership::MembershipSketchBuilder;
    /// assert_eq!(MembershipSketchBuilder::suggest_num_hashes(1000, 19171), 13);
    /// assert_eq!(MembershipSketchBuilder::suggest_num_hashes(1000, 10), 1);
    /// ```
    pub fn suggest_num_hashes(capacity: u64, size: u64) -> u32 {
        let m = size as f64;
        let n = capacity as f64;

        let k = (m / n * std::f64::consts::LN_2).floor();
        (k as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_size_is_monotone_in_error_rate() {
        let rates = [0.5, 0.1, 0.01, 0.001, 0.0001, 0.00001];
        for capacity in [1, 10, 100, 1000] {
            let sizes: Vec<u64> = rates
                .iter()
                .map(|&p| MembershipSketchBuilder::suggest_size(capacity, p))
                .collect();
            for pair in sizes.windows(2) {
                assert!(pair[0] < pair[1], "sizes {sizes:?} for capacity {capacity}");
            }
        }
    }

    #[test]
    fn test_small_parameters_stay_positive() {
        let sketch = MembershipSketchBuilder::with_accuracy(1, 0.5).build().unwrap();
        assert_eq!(sketch.size(), 2);
        assert_eq!(sketch.num_hashes(), 1);

        let sketch = MembershipSketchBuilder::with_accuracy(1, 0.999).build().unwrap();
        assert_eq!(sketch.size(), 1);
        assert_eq!(sketch.num_hashes(), 1);
    }

    #[test]
    fn test_invalid_parameters() {
        let err = MembershipSketchBuilder::with_accuracy(0, 0.01)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        for rate in [0.0, 1.0, 1.5, -0.1, f64::NAN] {
            let err = MembershipSketchBuilder::with_accuracy(100, rate)
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "rate {rate}");
        }

        let err = MembershipSketchBuilder::with_accuracy(u64::MAX, 0.0001)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
}
