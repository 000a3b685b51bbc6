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

use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::lt;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rangesketch::error::ErrorKind;
use rangesketch::membership::MembershipSketch;
use rangesketch::membership::MembershipSketchBuilder;

#[test]
fn test_sizing_examples() {
    let sketch = MembershipSketch::new(0, 100, 0.0001).unwrap();
    assert_eq!(sketch.size(), 1918);
    assert_eq!(sketch.num_hashes(), 13);

    let sketch = MembershipSketch::new(0, 1000, 0.0001).unwrap();
    assert_eq!(sketch.size(), 19171);
    assert_eq!(sketch.num_hashes(), 13);
}

#[test]
fn test_no_false_negatives() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let items: Vec<u64> = (0..2_000).map(|_| rng.random()).collect();

    let mut sketch = MembershipSketch::new(1042, 2_000, 0.001).unwrap();
    sketch.insert_all(&items);

    for item in &items {
        assert!(sketch.contains(item), "missing {item}");
    }
}

#[test]
fn test_false_positive_rate() {
    let mut sketch = MembershipSketch::new(0, 1_000, 0.0001).unwrap();
    sketch.insert_all(0..1_000);

    let false_positives = (1_000..101_000).filter(|v| sketch.contains(v)).count();
    let rate = false_positives as f64 / 100_000.0;
    assert_that!(rate, lt(0.001));
}

#[test]
fn test_items_match_by_string_form() {
    let mut sketch = MembershipSketch::new(5, 10, 0.01).unwrap();
    sketch.insert(&7_i64);

    assert!(sketch.contains("7"));
    assert!(sketch.contains(&7_u8));
    assert!(sketch.contains(&String::from("7")));
}

#[test]
fn test_seed_changes_bit_layout() {
    let mut a = MembershipSketch::new(0, 100, 0.01).unwrap();
    let mut b = MembershipSketch::new(1000, 100, 0.01).unwrap();
    a.insert_all(0..100);
    b.insert_all(0..100);

    assert_eq!(a.size(), b.size());
    assert_ne!(a.serialize()[48..], b.serialize()[48..]);
}

#[test]
fn test_invalid_parameters() {
    for (capacity, error_rate) in [(0, 0.01), (10, 0.0), (10, 1.0), (10, -0.5), (10, f64::NAN)] {
        let err = MembershipSketchBuilder::with_accuracy(capacity, error_rate)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    let err = MembershipSketch::new(0, u64::MAX, 1e-9).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_that!(err.message(), contains_substring("must not exceed"));
}

#[test]
fn test_serialization_preserves_answers() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut sketch = MembershipSketch::new(99, 500, 0.001).unwrap();
    let inserted: Vec<String> = (0..500)
        .map(|_| format!("id-{}", rng.random::<u32>()))
        .collect();
    sketch.insert_all(&inserted);

    let restored = MembershipSketch::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored, sketch);

    for probe in 0..5_000 {
        let probe = format!("probe-{probe}");
        assert_eq!(restored.contains(&probe), sketch.contains(&probe));
    }
}

#[test]
fn test_deserialize_rejects_cardinality_bytes() {
    let mut cardinality = rangesketch::cardinality::CardinalitySketch::new(64, 0).unwrap();
    cardinality.insert("a");

    let err = MembershipSketch::deserialize(&cardinality.serialize()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert_that!(err.message(), contains_substring("invalid family"));
}
