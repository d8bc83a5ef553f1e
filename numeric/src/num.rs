// Copyright Materialize, Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository, or online at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::convert::TryFrom;

use num_traits::{Bounded, FromPrimitive, ToPrimitive};

use crate::numeric::{NumericValue, MAX_PACKED, SCALING_FACTOR};

impl Bounded for NumericValue {
    fn min_value() -> NumericValue {
        NumericValue::MIN
    }

    fn max_value() -> NumericValue {
        NumericValue::MAX
    }
}

/// Conversions round half away from zero, like [`NumericValue::to`], and
/// return `None` when the rounded value does not fit.
impl ToPrimitive for NumericValue {
    fn to_i32(&self) -> Option<i32> {
        self.to::<i32>().ok()
    }

    fn to_u32(&self) -> Option<u32> {
        self.to::<u32>().ok()
    }

    fn to_i64(&self) -> Option<i64> {
        self.to::<i64>().ok()
    }

    fn to_u64(&self) -> Option<u64> {
        self.to::<u64>().ok()
    }

    fn to_i128(&self) -> Option<i128> {
        Some(self.rounded_integer())
    }

    fn to_u128(&self) -> Option<u128> {
        u128::try_from(self.rounded_integer()).ok()
    }

    /// Lossy: the scaled value is rounded once when converted to `f64` and
    /// again by the division by the scale factor.
    fn to_f64(&self) -> Option<f64> {
        Some(self.as_packed_int() as f64 / SCALING_FACTOR as f64)
    }
}

impl FromPrimitive for NumericValue {
    fn from_i32(n: i32) -> Option<NumericValue> {
        Some(NumericValue::from(n))
    }

    fn from_u32(n: u32) -> Option<NumericValue> {
        Some(NumericValue::from(n))
    }

    fn from_i64(n: i64) -> Option<NumericValue> {
        Some(NumericValue::from(n))
    }

    fn from_u64(n: u64) -> Option<NumericValue> {
        Some(NumericValue::from(n))
    }

    fn from_i128(n: i128) -> Option<NumericValue> {
        n.checked_mul(SCALING_FACTOR)
            .and_then(|v| NumericValue::from_packed_int(v).ok())
    }

    fn from_u128(n: u128) -> Option<NumericValue> {
        i128::try_from(n).ok().and_then(NumericValue::from_i128)
    }

    /// Rounds `n` to nine fractional digits, half away from zero.
    fn from_f64(n: f64) -> Option<NumericValue> {
        let scaled = (n * SCALING_FACTOR as f64).round();
        if scaled.is_finite() && scaled.abs() <= MAX_PACKED as f64 {
            NumericValue::from_packed_int(scaled as i128).ok()
        } else {
            None
        }
    }
}
