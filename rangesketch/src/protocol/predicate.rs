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

use crate::error::Error;

/// An axis-aligned 2D box described by one ordered list of values per dimension.
///
/// Every listed value of a dimension is inserted into that dimension's membership sketch. The
/// first and last values of each list are the inclusive bounds of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePredicate<C> {
    x_values: Vec<C>,
    y_values: Vec<C>,
}

impl<C> RangePredicate<C> {
    /// Values of the x dimension.
    pub fn x_values(&self) -> &[C] {
        &self.x_values
    }

    /// Values of the y dimension.
    pub fn y_values(&self) -> &[C] {
        &self.y_values
    }
}

impl<C: PartialOrd> RangePredicate<C> {
    /// Creates a predicate from the values of each dimension.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a dimension is empty or its values are not in
    /// non-decreasing order.
    pub fn new(x_values: Vec<C>, y_values: Vec<C>) -> Result<Self, Error> {
        check_dimension("x", &x_values)?;
        check_dimension("y", &y_values)?;
        Ok(RangePredicate { x_values, y_values })
    }

    /// Returns whether `(x, y)` lies inside the box, bounds included.
    pub fn contains(&self, x: &C, y: &C) -> bool {
        within(&self.x_values, x) && within(&self.y_values, y)
    }
}

impl RangePredicate<i64> {
    /// Builds the square `[start_x, start_x + length) x [start_y, start_y + length)` on the
    /// integer grid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `length` is 0 or the square leaves the `i64` range.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rangesketch::protocol::RangePredicate;
    /// let predicate = RangePredicate::square(10, 20, 5).unwrap();
    /// assert_eq!(predicate.x_values(), &[10, 11, 12, 13, 14]);
    /// assert!(predicate.contains(&14, &24));
    /// assert!(!predicate.contains(&15, &24));
    /// ```
    pub fn square(start_x: i64, start_y: i64, length: u64) -> Result<Self, Error> {
        if length == 0 {
            return Err(Error::invalid_parameter("length must be greater than 0"));
        }
        let x_values = grid_range(start_x, length)?;
        let y_values = grid_range(start_y, length)?;
        Ok(RangePredicate { x_values, y_values })
    }
}

fn grid_range(start: i64, length: u64) -> Result<Vec<i64>, Error> {
    let end = i64::try_from(length)
        .ok()
        .and_then(|length| start.checked_add(length))
        .ok_or_else(|| {
            Error::invalid_parameter("range exceeds the i64 coordinate space")
                .with_context("start", start)
                .with_context("length", length)
        })?;
    Ok((start..end).collect())
}

fn check_dimension<C: PartialOrd>(name: &'static str, values: &[C]) -> Result<(), Error> {
    if values.is_empty() {
        return Err(
            Error::invalid_parameter("predicate dimension has no values")
                .with_context("dimension", name),
        );
    }
    if !values.windows(2).all(|pair| pair[0] <= pair[1]) {
        return Err(
            Error::invalid_parameter("predicate values must be in non-decreasing order")
                .with_context("dimension", name),
        );
    }
    Ok(())
}

fn within<C: PartialOrd>(values: &[C], value: &C) -> bool {
    match (values.first(), values.last()) {
        (Some(low), Some(high)) => low <= value && value <= high,
        _ => false,
    }
}
