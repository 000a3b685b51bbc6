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

//! Multi-provider range counting built from the two sketches.
//!
//! A trial answers "how many distinct records fall inside this box?" when the records are
//! spread over several providers:
//!
//! 1. The querier inserts every value of each predicate dimension into a
//!    [membership sketch](crate::membership), one per dimension with its own seed.
//! 2. Each provider keeps the records whose `x` and `y` both test as possibly present, and
//!    inserts their ids into its own [cardinality sketch](crate::cardinality).
//! 3. The aggregator ORs the provider sketches and estimates the size of the union.
//!
//! Step 2 never sees the raw bounds, and step 3 never sees a record. The price is error from
//! two sources: membership false positives let outside records through, and linear counting
//! is approximate.
//!
//! # Usage
//!
//! ```rust
//! use rangesketch::protocol::{PredicateSketches, ProviderBatch, RangePredicate, Record, TrialConfig};
//!
//! let config = TrialConfig::builder().seed(7).provider_count(2).build().unwrap();
//! let predicate = RangePredicate::square(100, 100, 20).unwrap();
//!
//! let alice = vec![Record::new("car-1", 105, 110), Record::new("car-2", 300, 300)];
//! let bob = vec![Record::new("car-1", 105, 110), Record::new("car-3", 119, 100)];
//! let batches = [
//!     ProviderBatch::partition(alice, &predicate),
//!     ProviderBatch::partition(bob, &predicate),
//! ];
//!
//! let outcome = PredicateSketches::build(&config, &predicate)
//!     .and_then(|sketches| sketches.filter(&batches))
//!     .and_then(|filtered| filtered.merge())
//!     .map(|merged| merged.finish())
//!     .unwrap();
//! assert_eq!(outcome.ground_truth_count, 2);
//! assert_eq!(outcome.estimated_count, 2);
//! ```
//!
//! [`Trial::run`] performs the same chain in one call.

mod config;
mod predicate;
mod record;
mod trial;

pub use self::config::TrialConfig;
pub use self::config::TrialConfigBuilder;
pub use self::predicate::RangePredicate;
pub use self::record::ProviderBatch;
pub use self::record::Record;
pub use self::trial::FilteredProviders;
pub use self::trial::MergedSketch;
pub use self::trial::PredicateSketches;
pub use self::trial::Trial;
pub use self::trial::TrialOutcome;
pub use self::trial::TrialPhase;
