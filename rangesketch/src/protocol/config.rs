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

use crate::cardinality;
use crate::error::Error;

const DEFAULT_MEMBERSHIP_ERROR_RATE: f64 = 0.0001;
const DEFAULT_CARDINALITY_SKETCH_SIZE: u64 = 1024 * 8;
const DEFAULT_DIMENSION_SEED_STRIDE: u32 = 1000;

/// Options of one trial of the aggregation protocol.
///
/// Build with [`TrialConfig::builder()`]; every option has a default.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialConfig {
    seed: u32,
    membership_error_rate: f64,
    cardinality_sketch_size: u64,
    provider_count: Option<usize>,
    dimension_seed_stride: u32,
    parallel: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        TrialConfig {
            seed: 0,
            membership_error_rate: DEFAULT_MEMBERSHIP_ERROR_RATE,
            cardinality_sketch_size: DEFAULT_CARDINALITY_SKETCH_SIZE,
            provider_count: None,
            dimension_seed_stride: DEFAULT_DIMENSION_SEED_STRIDE,
            parallel: false,
        }
    }
}

impl TrialConfig {
    /// Returns a builder initialized with the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangesketch::protocol::TrialConfig;
    ///
    /// let config = TrialConfig::builder()
    ///     .seed(4242)
    ///     .membership_error_rate(0.001)
    ///     .cardinality_sketch_size(4096)
    ///     .provider_count(3)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.dimension_seeds(), [4242, 5242]);
    /// ```
    pub fn builder() -> TrialConfigBuilder {
        TrialConfigBuilder {
            config: TrialConfig::default(),
        }
    }

    /// Root of all randomness in the trial.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Target false positive rate of each predicate-dimension sketch.
    pub fn membership_error_rate(&self) -> f64 {
        self.membership_error_rate
    }

    /// Bit count shared by every provider's cardinality sketch.
    pub fn cardinality_sketch_size(&self) -> u64 {
        self.cardinality_sketch_size
    }

    /// Number of provider batches a trial expects, if fixed.
    pub fn provider_count(&self) -> Option<usize> {
        self.provider_count
    }

    /// Seed offset between consecutive predicate dimensions.
    pub fn dimension_seed_stride(&self) -> u32 {
        self.dimension_seed_stride
    }

    /// Whether providers are filtered on scoped threads.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Seeds of the x and y membership sketches: `seed` and `seed + stride`.
    pub fn dimension_seeds(&self) -> [u32; 2] {
        [self.seed, self.seed.wrapping_add(self.dimension_seed_stride)]
    }
}

/// Builder for [`TrialConfig`].
#[derive(Debug, Clone)]
pub struct TrialConfigBuilder {
    config: TrialConfig,
}

impl TrialConfigBuilder {
    /// Sets the trial seed (default: 0).
    pub fn seed(mut self, seed: u32) -> Self {
        self.config.seed = seed;
        self
    }

    /// Sets the membership sketch false positive rate (default: 0.0001).
    pub fn membership_error_rate(mut self, error_rate: f64) -> Self {
        self.config.membership_error_rate = error_rate;
        self
    }

    /// Sets the cardinality sketch size in bits (default: 8192).
    pub fn cardinality_sketch_size(mut self, size: u64) -> Self {
        self.config.cardinality_sketch_size = size;
        self
    }

    /// Requires every trial to receive exactly `count` provider batches (default: any).
    pub fn provider_count(mut self, count: usize) -> Self {
        self.config.provider_count = Some(count);
        self
    }

    /// Sets the seed offset between predicate dimensions (default: 1000).
    ///
    /// Keep it larger than the number of membership hash rounds so the dimensions never share
    /// a hash function.
    pub fn dimension_seed_stride(mut self, stride: u32) -> Self {
        self.config.dimension_seed_stride = stride;
        self
    }

    /// Filters providers on scoped threads, one per provider (default: false).
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Validates the options and returns the config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the error rate is outside (0.0, 1.0), the sketch size is 0
    /// or above 2^35 bits, the provider count is 0, or the seed stride is 0.
    pub fn build(self) -> Result<TrialConfig, Error> {
        let config = self.config;

        let rate = config.membership_error_rate;
        if !(rate > 0.0 && rate < 1.0) {
            return Err(Error::invalid_parameter(
                "membership_error_rate must be between 0.0 and 1.0 (exclusive)",
            )
            .with_context("membership_error_rate", rate));
        }
        if config.cardinality_sketch_size == 0 {
            return Err(Error::invalid_parameter(
                "cardinality_sketch_size must be greater than 0",
            ));
        }
        if config.cardinality_sketch_size > cardinality::MAX_SIZE {
            return Err(Error::invalid_parameter(format!(
                "cardinality_sketch_size must not exceed {} bits",
                cardinality::MAX_SIZE
            ))
            .with_context("cardinality_sketch_size", config.cardinality_sketch_size));
        }
        if config.provider_count == Some(0) {
            return Err(Error::invalid_parameter(
                "provider_count must be greater than 0",
            ));
        }
        if config.dimension_seed_stride == 0 {
            return Err(Error::invalid_parameter(
                "dimension_seed_stride must be greater than 0",
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = TrialConfig::builder().build().unwrap();
        assert_eq!(config, TrialConfig::default());
        assert_eq!(config.membership_error_rate(), 0.0001);
        assert_eq!(config.cardinality_sketch_size(), 8192);
        assert_eq!(config.provider_count(), None);
        assert_eq!(config.dimension_seeds(), [0, 1000]);
        assert!(!config.parallel());
    }

    #[test]
    fn test_dimension_seeds_wrap() {
        let config = TrialConfig::builder().seed(u32::MAX).build().unwrap();
        assert_eq!(config.dimension_seeds(), [u32::MAX, 999]);
    }

    #[test]
    fn test_invalid_options() {
        let cases = [
            TrialConfig::builder().membership_error_rate(0.0),
            TrialConfig::builder().membership_error_rate(1.5),
            TrialConfig::builder().cardinality_sketch_size(0),
            TrialConfig::builder().cardinality_sketch_size(1 << 40),
            TrialConfig::builder().provider_count(0),
            TrialConfig::builder().dimension_seed_stride(0),
        ];
        for builder in cases {
            let err = builder.build().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }
    }

    #[test]
    fn test_largest_cardinality_sketch_size() {
        let config = TrialConfig::builder()
            .cardinality_sketch_size(1 << 35)
            .build()
            .unwrap();
        assert_eq!(config.cardinality_sketch_size(), 1 << 35);

        let err = TrialConfig::builder()
            .cardinality_sketch_size((1 << 35) + 1)
            .build()
            .unwrap_err();
        assert!(err.message().contains("must not exceed"));
    }
}
