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

use std::fmt::Display;

/// Hashes raw bytes with 32-bit MurmurHash3 (x86 variant).
pub fn hash_bytes(bytes: &[u8], seed: u32) -> u32 {
    mur3::murmurhash3_x86_32(bytes, seed)
}

/// Hashes the string form of `item` with the given seed.
///
/// # Examples
///
/// ```
/// use rangesketch::hash::hash;
///
/// assert_eq!(hash(&42, 7), hash("42", 7));
/// assert_ne!(hash("42", 7), hash("42", 8));
/// ```
pub fn hash<T: Display + ?Sized>(item: &T, seed: u32) -> u32 {
    hash_bytes(item.to_string().as_bytes(), seed)
}
