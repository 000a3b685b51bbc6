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

//! # rangesketch
//!
//! Estimates how many distinct records fall inside an axis-aligned 2D box when the records
//! are split across several data providers. No provider sees the box bounds and the
//! aggregator never sees a record; both only exchange sketches.
//!
//! The crate is organized in layers:
//!
//! - [`hash`]: the seeded 32-bit MurmurHash3 family every sketch draws from
//! - [`membership`]: a Bloom-style sketch that encodes one predicate dimension
//! - [`cardinality`]: a linear counting sketch whose OR-merge models set union
//! - [`protocol`]: configuration, records and the phases of one counting trial
//!
//! Events are emitted through [`tracing`]; install a subscriber to see them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod cardinality;
pub mod error;
pub mod hash;
pub mod membership;
pub mod protocol;

mod codec;
