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

//! The seeded hash family shared by both sketches.
//!
//! Every sketch in this crate hashes the *string form* of an item with 32-bit MurmurHash3
//! (x86 variant). Changing the seed selects a different member of the family, which is how the
//! membership sketch derives its `k` hash functions: round `i` uses seed `seed + i`.
//!
//! Because items are stringified first, `7_i64`, `7_u8` and `"7"` all hash to the same value.
//! Providers and the querier therefore agree on coordinates regardless of the concrete numeric
//! type each side uses.

mod murmurhash;

pub use self::murmurhash::hash;
pub use self::murmurhash::hash_bytes;

/// Computes the 16-bit seed hash stored in serialized sketches.
///
/// Decoders recompute it from the stored seed and reject the bytes on mismatch.
pub(crate) fn compute_seed_hash(seed: u32) -> u16 {
    let h = hash_bytes(&seed.to_le_bytes(), 0);
    (h & 0xffff) as u16
}
