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

//! Membership sketch (a Bloom filter) for testing predicate values without revealing them.
//!
//! The querier inserts every value of one predicate dimension into a membership sketch and
//! hands the sketch to the providers. A provider learns only "possibly present" or
//! "definitely absent" for each of its own coordinates.
//!
//! # Properties
//!
//! - **No false negatives**: if an item was inserted, `contains()` always returns `true`
//! - **Possible false positives**: `contains()` may return `true` for items never inserted, with
//!   probability close to the configured error rate while the sketch holds at most `capacity`
//!   items
//! - **Fixed size**: the bit array is sized once, at construction
//!
//! # Usage
//!
//! ```rust
//! use rangesketch::membership::MembershipSketch;
//!
//! let mut sketch = MembershipSketch::new(42, 100, 0.0001).unwrap();
//! sketch.insert_all(100..200);
//!
//! assert!(sketch.contains(&150));
//! assert!(sketch.contains("150")); // items are hashed by their string form
//! ```
//!
//! # Sizing
//!
//! `size = ceil(-capacity * ln(error_rate) / ln(2)^2)` bits and
//! `num_hashes = max(1, floor(size / capacity * ln(2)))`.
//!
//! Hash round `i` uses seed `seed + i` of the shared [hash family](crate::hash), so a single
//! primitive stands in for `num_hashes` independent functions.
//!
//! ```rust
//! use rangesketch::membership::MembershipSketchBuilder;
//!
//! assert_eq!(MembershipSketchBuilder::suggest_size(100, 0.0001), 1918);
//! assert_eq!(MembershipSketchBuilder::suggest_num_hashes(100, 1918), 13);
//!
//! let sketch = MembershipSketchBuilder::with_accuracy(100, 0.0001)
//!     .seed(1042)
//!     .build()
//!     .unwrap();
//! assert_eq!(sketch.size(), 1918);
//! assert_eq!(sketch.num_hashes(), 13);
//! ```

mod builder;
mod sketch;

pub use self::builder::MembershipSketchBuilder;
pub use self::sketch::MembershipSketch;

/// Largest accepted bit array: 2^35 bits, 4 GiB.
const MAX_SIZE: u64 = 1u64 << 35;
