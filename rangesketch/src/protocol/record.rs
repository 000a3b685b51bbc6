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

use super::RangePredicate;

/// One record held by a data provider.
///
/// `id` is the key counted by the cardinality sketches; the same `id` held by several
/// providers is one distinct record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record<C> {
    id: String,
    x: C,
    y: C,
}

impl<C> Record<C> {
    /// Creates a record.
    pub fn new(id: impl Into<String>, x: C, y: C) -> Self {
        Record { id: id.into(), x, y }
    }

    /// Stable identifier of the record.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// First coordinate.
    pub fn x(&self) -> &C {
        &self.x
    }

    /// Second coordinate.
    pub fn y(&self) -> &C {
        &self.y
    }
}

/// The records of one provider, split by whether they truly fall inside the query box.
///
/// The split only feeds the ground truth of a trial. Filtering scans both lists alike.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderBatch<C> {
    inside: Vec<Record<C>>,
    outside: Vec<Record<C>>,
}

impl<C> Default for ProviderBatch<C> {
    fn default() -> Self {
        ProviderBatch {
            inside: vec![],
            outside: vec![],
        }
    }
}

impl<C> ProviderBatch<C> {
    /// Creates a batch from an already split record set.
    pub fn new(inside: Vec<Record<C>>, outside: Vec<Record<C>>) -> Self {
        ProviderBatch { inside, outside }
    }

    /// Records that fall inside the query box.
    pub fn inside(&self) -> &[Record<C>] {
        &self.inside
    }

    /// Records that fall outside the query box.
    pub fn outside(&self) -> &[Record<C>] {
        &self.outside
    }

    /// All records, inside ones first.
    pub fn records(&self) -> impl Iterator<Item = &Record<C>> {
        self.inside.iter().chain(self.outside.iter())
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.inside.len() + self.outside.len()
    }

    /// Returns whether the batch holds no record.
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty() && self.outside.is_empty()
    }
}

impl<C: PartialOrd> ProviderBatch<C> {
    /// Splits records by the box of `predicate`, keeping their relative order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::protocol::{ProviderBatch, RangePredicate, Record};
    /// let predicate = RangePredicate::square(0, 0, 10).unwrap();
    /// let batch = ProviderBatch::partition(
    ///     vec![Record::new("a", 3, 4), Record::new("b", 30, 4), Record::new("c", 9, 0)],
    ///     &predicate,
    /// );
    /// assert_eq!(batch.inside().len(), 2);
    /// assert_eq!(batch.outside()[0].id(), "b");
    /// ```
    pub fn partition<I>(records: I, predicate: &RangePredicate<C>) -> Self
    where
        I: IntoIterator<Item = Record<C>>,
    {
        let (inside, outside) = records
            .into_iter()
            .partition(|record| predicate.contains(&record.x, &record.y));
        ProviderBatch { inside, outside }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_order() {
        let predicate = RangePredicate::square(5, 5, 5).unwrap();
        let records = (0..20).map(|i| Record::new(format!("r{i}"), i, i));
        let batch = ProviderBatch::partition(records, &predicate);

        let inside: Vec<&str> = batch.inside().iter().map(Record::id).collect();
        assert_eq!(inside, ["r5", "r6", "r7", "r8", "r9"]);
        assert_eq!(batch.outside().len(), 15);
        assert_eq!(batch.len(), 20);
        assert_eq!(batch.records().next().map(Record::id), Some("r5"));
    }

    #[test]
    fn test_empty_batch() {
        let batch = ProviderBatch::<i64>::default();
        assert!(batch.is_empty());
        assert_eq!(batch.records().count(), 0);
    }
}
