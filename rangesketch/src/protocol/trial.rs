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

use std::collections::HashSet;
use std::fmt;
use std::fmt::Display;
use std::thread;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ProviderBatch;
use super::RangePredicate;
use super::Record;
use super::TrialConfig;
use crate::cardinality::CardinalitySketch;
use crate::error::Error;
use crate::membership::MembershipSketch;

/// Progress of one trial. Every phase after `Initialized` has a matching stage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrialPhase {
    /// Config and predicate are known; nothing is built yet.
    Initialized,
    /// One membership sketch per dimension is ready ([`PredicateSketches`]).
    PredicateSketchesBuilt,
    /// Every provider has built its cardinality sketch ([`FilteredProviders`]).
    ProvidersFiltered,
    /// Provider sketches are folded into one ([`MergedSketch`]).
    SketchesMerged,
    /// The estimate is paired with the ground truth ([`TrialOutcome`]).
    EstimateReady,
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrialPhase::Initialized => "Initialized",
            TrialPhase::PredicateSketchesBuilt => "PredicateSketchesBuilt",
            TrialPhase::ProvidersFiltered => "ProvidersFiltered",
            TrialPhase::SketchesMerged => "SketchesMerged",
            TrialPhase::EstimateReady => "EstimateReady",
        };
        f.write_str(name)
    }
}

/// Runs complete trials under one config.
///
/// # Examples
///
/// ```
/// use rangesketch::protocol::{ProviderBatch, RangePredicate, Record, Trial, TrialConfig};
///
/// let predicate = RangePredicate::square(0, 0, 50).unwrap();
/// let records = |prefix: &str| {
///     (0..100).map(|i| Record::new(format!("{prefix}-{i}"), i, i)).collect::<Vec<_>>()
/// };
/// let batches = vec![
///     ProviderBatch::partition(records("a"), &predicate),
///     ProviderBatch::partition(records("b"), &predicate),
/// ];
///
/// let trial = Trial::new(TrialConfig::builder().seed(3).build().unwrap());
/// let outcome = trial.run(&predicate, &batches).unwrap();
/// assert_eq!(outcome.ground_truth_count, 100);
/// assert!(outcome.absolute_error() <= 5);
/// ```
#[derive(Debug, Clone)]
pub struct Trial {
    config: TrialConfig,
}

impl Trial {
    /// Creates a trial runner.
    pub fn new(config: TrialConfig) -> Self {
        Trial { config }
    }

    /// Returns the config every run uses.
    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Runs every phase: builds the predicate sketches, filters each provider, merges and
    /// estimates.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if the predicate sketches cannot be built or the number of batches
    ///   differs from the configured provider count
    /// - `EmptyAggregation` if there is no batch or no provider has a matching record
    pub fn run<C>(
        &self,
        predicate: &RangePredicate<C>,
        batches: &[ProviderBatch<C>],
    ) -> Result<TrialOutcome, Error>
    where
        C: Display + Sync,
    {
        let outcome = PredicateSketches::build(&self.config, predicate)?
            .filter(batches)?
            .merge()?
            .finish();
        Ok(outcome)
    }
}

/// The querier's encoding of a predicate: one membership sketch per dimension.
#[derive(Debug, Clone)]
pub struct PredicateSketches {
    config: TrialConfig,
    x_sketch: MembershipSketch,
    y_sketch: MembershipSketch,
}

impl PredicateSketches {
    /// Inserts every value of each predicate dimension into a fresh membership sketch.
    ///
    /// The x sketch uses the trial seed, the y sketch the seed plus the dimension stride.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a dimension has no value or its sketch is too large.
    pub fn build<C: Display>(
        config: &TrialConfig,
        predicate: &RangePredicate<C>,
    ) -> Result<Self, Error> {
        let [x_seed, y_seed] = config.dimension_seeds();
        let x_sketch = dimension_sketch(config, x_seed, predicate.x_values())?;
        let y_sketch = dimension_sketch(config, y_seed, predicate.y_values())?;

        debug!(
            phase = %TrialPhase::PredicateSketchesBuilt,
            x_size = x_sketch.size(),
            y_size = y_sketch.size(),
            num_hashes = x_sketch.num_hashes(),
            "built predicate sketches"
        );

        Ok(PredicateSketches {
            config: config.clone(),
            x_sketch,
            y_sketch,
        })
    }

    /// Sketch of the x dimension.
    pub fn x_sketch(&self) -> &MembershipSketch {
        &self.x_sketch
    }

    /// Sketch of the y dimension.
    pub fn y_sketch(&self) -> &MembershipSketch {
        &self.y_sketch
    }

    /// Returns whether both coordinates of `record` possibly belong to the predicate.
    ///
    /// Never false for a record inside the box; may be true for one outside it.
    pub fn matches<C: Display>(&self, record: &Record<C>) -> bool {
        self.x_sketch.contains(record.x()) && self.y_sketch.contains(record.y())
    }

    /// Builds one provider's cardinality sketch over the ids of its matching records.
    ///
    /// Returns `None` when no record of the batch matches; such a provider contributes nothing
    /// to the aggregate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the configured cardinality sketch size is out of range.
    pub fn provider_sketch<C: Display>(
        &self,
        batch: &ProviderBatch<C>,
    ) -> Result<Option<CardinalitySketch>, Error> {
        let mut sketch =
            CardinalitySketch::new(self.config.cardinality_sketch_size(), self.config.seed())?;
        let mut passed = 0usize;
        for record in batch.records().filter(|record| self.matches(record)) {
            sketch.insert(record.id());
            passed += 1;
        }
        Ok((passed > 0).then_some(sketch))
    }

    /// Runs every provider's side of the protocol.
    ///
    /// Providers run one after another, or on one scoped thread each when the config enables
    /// `parallel`. Both modes give the same result.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the config fixes a provider count and `batches` is
    /// non-empty with a different length.
    pub fn filter<C>(&self, batches: &[ProviderBatch<C>]) -> Result<FilteredProviders, Error>
    where
        C: Display + Sync,
    {
        if let Some(expected) = self.config.provider_count() {
            if !batches.is_empty() && batches.len() != expected {
                return Err(Error::invalid_parameter(
                    "number of provider batches differs from provider_count",
                )
                .with_context("expected", expected)
                .with_context("actual", batches.len()));
            }
        }

        let results = if self.config.parallel() {
            thread::scope(|scope| {
                let handles: Vec<_> = batches
                    .iter()
                    .enumerate()
                    .map(|(index, batch)| scope.spawn(move || self.filter_provider(index, batch)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect::<Vec<_>>()
            })
        } else {
            batches
                .iter()
                .enumerate()
                .map(|(index, batch)| self.filter_provider(index, batch))
                .collect()
        };

        let mut sketches = Vec::with_capacity(results.len());
        for result in results {
            if let Some(sketch) = result? {
                sketches.push(sketch);
            }
        }

        debug!(
            phase = %TrialPhase::ProvidersFiltered,
            providers = batches.len(),
            contributors = sketches.len(),
            "filtered providers"
        );

        Ok(FilteredProviders {
            sketches,
            provider_count: batches.len(),
            ground_truth_count: ground_truth(batches),
        })
    }

    /// Phase reached by this stage.
    pub fn phase(&self) -> TrialPhase {
        TrialPhase::PredicateSketchesBuilt
    }

    fn filter_provider<C: Display>(
        &self,
        index: usize,
        batch: &ProviderBatch<C>,
    ) -> Result<Option<CardinalitySketch>, Error> {
        let sketch = self.provider_sketch(batch)?;
        debug!(
            provider = index,
            scanned = batch.len(),
            contributed = sketch.is_some(),
            bits_used = sketch.as_ref().map_or(0, CardinalitySketch::bits_used),
            "filtered provider records"
        );
        Ok(sketch)
    }
}

fn dimension_sketch<C: Display>(
    config: &TrialConfig,
    seed: u32,
    values: &[C],
) -> Result<MembershipSketch, Error> {
    let mut sketch =
        MembershipSketch::new(seed, values.len() as u64, config.membership_error_rate())?;
    sketch.insert_all(values);
    Ok(sketch)
}

fn ground_truth<C>(batches: &[ProviderBatch<C>]) -> u64 {
    let ids: HashSet<&str> = batches
        .iter()
        .flat_map(ProviderBatch::inside)
        .map(Record::id)
        .collect();
    ids.len() as u64
}

/// Cardinality sketches of the providers that had at least one matching record.
#[derive(Debug, Clone)]
pub struct FilteredProviders {
    sketches: Vec<CardinalitySketch>,
    provider_count: usize,
    ground_truth_count: u64,
}

impl FilteredProviders {
    /// Sketches of the contributing providers, in provider order.
    pub fn sketches(&self) -> &[CardinalitySketch] {
        &self.sketches
    }

    /// Number of provider batches that were filtered.
    pub fn provider_count(&self) -> usize {
        self.provider_count
    }

    /// Number of distinct ids over all providers' inside records.
    pub fn ground_truth_count(&self) -> u64 {
        self.ground_truth_count
    }

    /// Phase reached by this stage.
    pub fn phase(&self) -> TrialPhase {
        TrialPhase::ProvidersFiltered
    }

    /// Folds the provider sketches into one by bitwise OR.
    ///
    /// # Errors
    ///
    /// Returns `EmptyAggregation` if no provider contributed a sketch.
    pub fn merge(self) -> Result<MergedSketch, Error> {
        let contributors = self.sketches.len();
        let mut sketches = self.sketches.into_iter();
        let Some(mut aggregate) = sketches.next() else {
            debug!(
                providers = self.provider_count,
                "trial abandoned: no provider contributed a sketch"
            );
            return Err(
                Error::empty_aggregation("no provider contributed a sketch")
                    .with_context("providers", self.provider_count),
            );
        };
        for sketch in sketches {
            aggregate.union(&sketch)?;
        }

        debug!(
            phase = %TrialPhase::SketchesMerged,
            contributors,
            bits_used = aggregate.bits_used(),
            "merged provider sketches"
        );

        Ok(MergedSketch {
            aggregate,
            contributors,
            ground_truth_count: self.ground_truth_count,
        })
    }
}

/// The union of all contributing provider sketches.
#[derive(Debug, Clone)]
pub struct MergedSketch {
    aggregate: CardinalitySketch,
    contributors: usize,
    ground_truth_count: u64,
}

impl MergedSketch {
    /// The aggregate sketch.
    pub fn aggregate(&self) -> &CardinalitySketch {
        &self.aggregate
    }

    /// Number of providers whose sketch is in the aggregate.
    pub fn contributors(&self) -> usize {
        self.contributors
    }

    /// Phase reached by this stage.
    pub fn phase(&self) -> TrialPhase {
        TrialPhase::SketchesMerged
    }

    /// Estimates the distinct count and pairs it with the ground truth.
    pub fn finish(self) -> TrialOutcome {
        let estimated_count = self.aggregate.estimate();
        if self.aggregate.is_saturated() {
            warn!(
                size = self.aggregate.size(),
                "aggregate sketch is saturated; the estimate is only an upper bound"
            );
        }

        let outcome = TrialOutcome {
            estimated_count,
            ground_truth_count: self.ground_truth_count,
            contributors: self.contributors,
        };
        info!(
            phase = %TrialPhase::EstimateReady,
            estimated_count,
            ground_truth_count = outcome.ground_truth_count,
            contributors = outcome.contributors,
            "trial finished"
        );
        outcome
    }
}

/// Result of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialOutcome {
    /// Distinct count estimated from the aggregate sketch.
    pub estimated_count: u64,
    /// Distinct ids over all providers' inside records.
    pub ground_truth_count: u64,
    /// Providers that contributed a sketch.
    pub contributors: usize,
}

impl TrialOutcome {
    /// `|estimated - ground truth|`.
    pub fn absolute_error(&self) -> u64 {
        self.estimated_count.abs_diff(self.ground_truth_count)
    }

    /// Absolute error divided by the ground truth; `None` when the ground truth is 0.
    pub fn relative_error(&self) -> Option<f64> {
        if self.ground_truth_count == 0 {
            return None;
        }
        Some(self.absolute_error() as f64 / self.ground_truth_count as f64)
    }

    /// Phase reached by this stage.
    pub fn phase(&self) -> TrialPhase {
        TrialPhase::EstimateReady
    }
}
