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

//! Linear counting sketch for distinct-count estimation over a union of providers.
//!
//! Each item sets one bit, `hash(item, seed) mod size`. The estimate is the maximum-likelihood
//! number of distinct items given the fraction `V / m` of bits still at zero:
//!
//! ```text
//! n ≈ floor(-m * ln(V / m))
//! ```
//!
//! Sketches built with the same `size` and `seed` merge by bitwise OR, which models the union of
//! the underlying sets: an item seen by several providers sets the same bit in each of them and
//! is counted once.
//!
//! # Usage
//!
//! ```rust
//! use rangesketch::cardinality::CardinalitySketch;
//!
//! let mut a = CardinalitySketch::new(8192, 7).unwrap();
//! let mut b = CardinalitySketch::new(8192, 7).unwrap();
//! a.insert_all(0..300);
//! b.insert_all(200..500);
//!
//! let union = a.merge(&b).unwrap();
//! let estimate = union.estimate();
//! assert!(estimate > 450 && estimate < 550);
//! ```
//!
//! # Saturation
//!
//! Once every bit is set the estimator has no information left and [`estimate`] returns `size`
//! as an upper bound. Use [`is_saturated`] to detect this; keep `size` well above the expected
//! cardinality.
//!
//! [`estimate`]: CardinalitySketch::estimate
//! [`is_saturated`]: CardinalitySketch::is_saturated

mod serialization;
mod sketch;

pub use self::sketch::CardinalitySketch;

/// Largest accepted bit array: 2^35 bits, 4 GiB.
pub(crate) const MAX_SIZE: u64 = 1u64 << 35;
