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
use googletest::prelude::near;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rangesketch::cardinality::CardinalitySketch;
use rangesketch::error::ErrorKind;

#[test]
fn test_estimate_accuracy_across_seeds() {
    for seed in 0..20 {
        let mut sketch = CardinalitySketch::new(8192, seed).unwrap();
        sketch.insert_all(0..500);
        assert_that!(sketch.estimate() as f64, near(500.0, 20.0));
    }
}

#[test]
fn test_duplicates_do_not_count() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut stream: Vec<u32> = (0..100).cycle().take(1_000).collect();
    stream.shuffle(&mut rng);

    let mut with_duplicates = CardinalitySketch::new(4096, 1).unwrap();
    with_duplicates.insert_all(&stream);

    let mut distinct = CardinalitySketch::new(4096, 1).unwrap();
    distinct.insert_all(0..100);

    assert_eq!(with_duplicates, distinct);
}

#[test]
fn test_union_of_overlapping_sets() {
    let mut a = CardinalitySketch::new(8192, 7).unwrap();
    let mut b = CardinalitySketch::new(8192, 7).unwrap();
    a.insert_all(0..300);
    b.insert_all(200..500);

    let union = a.merge(&b).unwrap();
    assert_eq!(union.estimate(), 497);

    let mut direct = CardinalitySketch::new(8192, 7).unwrap();
    direct.insert_all(0..500);
    assert_eq!(union, direct);
}

#[test]
fn test_merge_laws() {
    let mut rng = StdRng::seed_from_u64(11);
    let sketches: Vec<CardinalitySketch> = (0..3)
        .map(|_| {
            let mut sketch = CardinalitySketch::new(2048, 9).unwrap();
            for _ in 0..200 {
                sketch.insert(&rng.random_range(0..1_000u32));
            }
            sketch
        })
        .collect();
    let (a, b, c) = (&sketches[0], &sketches[1], &sketches[2]);

    assert_eq!(a.merge(b).unwrap(), b.merge(a).unwrap());
    assert_eq!(
        a.merge(b).unwrap().merge(c).unwrap(),
        a.merge(&b.merge(c).unwrap()).unwrap()
    );
    assert_eq!(a.merge(a).unwrap(), *a);
}

#[test]
fn test_merge_rejects_incompatible() {
    let a = CardinalitySketch::new(1024, 0).unwrap();

    let other_size = CardinalitySketch::new(2048, 0).unwrap();
    let err = a.merge(&other_size).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSketch);
    assert_that!(err.to_string(), contains_substring("other_size: 2048"));

    let other_seed = CardinalitySketch::new(1024, 1).unwrap();
    let err = a.merge(&other_seed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSketch);
}

#[test]
fn test_saturation() {
    let mut sketch = CardinalitySketch::new(8, 0).unwrap();
    sketch.insert_all(0..1_000);
    assert!(sketch.is_saturated());
    assert_eq!(sketch.num_zero_bits(), 0);
    assert_eq!(sketch.estimate(), 8);
}

#[test]
fn test_serialization_round_trip() {
    let mut rng = StdRng::seed_from_u64(99);
    for size in [1, 63, 64, 65, 1000, 8192] {
        let mut sketch = CardinalitySketch::new(size, rng.random()).unwrap();
        for _ in 0..rng.random_range(1..200) {
            sketch.insert(&rng.random::<u64>());
        }

        let restored = CardinalitySketch::deserialize(&sketch.serialize()).unwrap();
        assert_eq!(restored, sketch);
    }
}

#[test]
fn test_deserialize_rejects_truncated_and_reseeded() {
    let mut sketch = CardinalitySketch::new(256, 1000).unwrap();
    sketch.insert_all(["a", "b", "c"]);
    let bytes = sketch.serialize();

    for len in [0, 7, 23, 31, bytes.len() - 1] {
        let err = CardinalitySketch::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData, "length {len}");
    }

    let mut reseeded = bytes;
    reseeded[8] ^= 0xff;
    let err = CardinalitySketch::deserialize(&reseeded).unwrap_err();
    assert_that!(err.message(), contains_substring("incompatible seed hash"));
}
