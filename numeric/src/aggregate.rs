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

//! Accumulators for summing many [`NumericValue`]s.
//!
//! Neither accumulator range-checks individual additions: partial sums may
//! exceed the range of a `NumericValue` as long as the final sum does not.
//! Overflow is therefore only reported by `finalize`.

use std::convert::TryInto;
use std::iter::FromIterator;
use std::num::NonZeroU64;

use ethnum::I256;
use tracing::debug;

use crate::error::{InvalidAggregatorStateError, OverflowError};
use crate::numeric::NumericValue;

/// Sums values in a 128-bit accumulator plus a count of how many times that
/// accumulator wrapped.
///
/// The true sum is `upper × 2^128 + lower`. A single 128-bit addition can only
/// move the sum by one multiple of 2<sup>128</sup>, in the direction of the
/// sign of the addend, so tracking the number of wraps is enough to recover
/// it. This keeps the per-addition cost at that of native 128-bit arithmetic.
///
/// The carry counter is 64 bits wide. If it overflows, which takes either
/// 2<sup>63</sup> additions or merging decoded states with extreme counters,
/// the overflow is latched and reported by
/// [`finalize`](CarryAggregator::finalize).
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct CarryAggregator {
    lower: i128,
    upper: i64,
    overflowed: bool,
}

impl CarryAggregator {
    /// The length of the encoding produced by
    /// [`to_le_bytes`](CarryAggregator::to_le_bytes).
    pub const ENCODED_LEN: usize = 25;

    /// Constructs an empty accumulator whose sum is zero.
    pub fn new() -> CarryAggregator {
        CarryAggregator::default()
    }

    /// Resets the sum to zero.
    pub fn reset(&mut self) {
        *self = CarryAggregator::default();
    }

    /// Adds `n` to the sum.
    pub fn add(&mut self, n: NumericValue) {
        self.add_packed(n.as_packed_int());
    }

    fn add_packed(&mut self, v: i128) {
        let (lower, wrapped) = self.lower.overflowing_add(v);
        self.lower = lower;
        if wrapped {
            self.add_carry(if v < 0 { -1 } else { 1 });
        }
    }

    fn add_carry(&mut self, carry: i64) {
        match self.upper.checked_add(carry) {
            Some(upper) => self.upper = upper,
            None => {
                debug!(upper = self.upper, carry, "numeric carry counter overflowed");
                self.overflowed = true;
            }
        }
    }

    /// Adds the sum accumulated by `other` to this sum.
    pub fn merge(&mut self, other: &CarryAggregator) {
        if other.overflowed {
            self.overflowed = true;
        }
        self.add_packed(other.lower);
        self.add_carry(other.upper);
    }

    /// Returns the exact scaled sum, or `None` if the carry counter
    /// overflowed.
    pub fn sum(&self) -> Option<I256> {
        if self.overflowed {
            None
        } else {
            Some((I256::from(self.upper) << 128u32) + I256::from(self.lower))
        }
    }

    /// Returns the sum as a `NumericValue`, failing if it is out of range.
    pub fn finalize(&self) -> Result<NumericValue, OverflowError> {
        let sum = self
            .sum()
            .ok_or_else(|| OverflowError::new("SUM (carry counter overflowed)"))?;
        NumericValue::from_wide(sum).map_err(|_| {
            debug!(%sum, "numeric SUM out of range");
            OverflowError::new(format!("SUM {}", sum))
        })
    }

    /// Encodes the accumulator state as 16 little-endian bytes of the lower
    /// accumulator, 8 little-endian bytes of the carry counter and one byte
    /// holding the overflow flag.
    pub fn to_le_bytes(&self) -> [u8; CarryAggregator::ENCODED_LEN] {
        let mut bytes = [0; CarryAggregator::ENCODED_LEN];
        bytes[..16].copy_from_slice(&self.lower.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.upper.to_le_bytes());
        bytes[24] = u8::from(self.overflowed);
        bytes
    }

    /// Decodes an accumulator state produced by
    /// [`to_le_bytes`](CarryAggregator::to_le_bytes).
    pub fn from_le_bytes(bytes: &[u8]) -> Result<CarryAggregator, InvalidAggregatorStateError> {
        if bytes.len() != CarryAggregator::ENCODED_LEN {
            return Err(InvalidAggregatorStateError);
        }
        let lower: [u8; 16] = bytes[..16]
            .try_into()
            .map_err(|_| InvalidAggregatorStateError)?;
        let upper: [u8; 8] = bytes[16..24]
            .try_into()
            .map_err(|_| InvalidAggregatorStateError)?;
        Ok(CarryAggregator {
            lower: i128::from_le_bytes(lower),
            upper: i64::from_le_bytes(upper),
            overflowed: decode_flag(bytes[24])?,
        })
    }
}

fn decode_flag(b: u8) -> Result<bool, InvalidAggregatorStateError> {
    match b {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(InvalidAggregatorStateError),
    }
}

impl Extend<NumericValue> for CarryAggregator {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = NumericValue>,
    {
        for n in iter {
            self.add(n);
        }
    }
}

impl FromIterator<NumericValue> for CarryAggregator {
    fn from_iter<I>(iter: I) -> CarryAggregator
    where
        I: IntoIterator<Item = NumericValue>,
    {
        let mut agg = CarryAggregator::new();
        agg.extend(iter);
        agg
    }
}

/// Sums values in a 256-bit accumulator.
///
/// Each addend is at most 127 bits wide, so any batch smaller than 2<sup>128</sup>
/// values fits. The 192 bits the design requires are comfortably covered; the
/// actual bound on batch sizes is enforced by the caller, not here. Should the
/// accumulator overflow anyway, the overflow is latched and reported by
/// [`finalize`](SumAggregator::finalize).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SumAggregator {
    sum: I256,
    overflowed: bool,
}

impl Default for SumAggregator {
    fn default() -> SumAggregator {
        SumAggregator {
            sum: I256::ZERO,
            overflowed: false,
        }
    }
}

impl SumAggregator {
    /// The length of the encoding produced by
    /// [`to_le_bytes`](SumAggregator::to_le_bytes).
    pub const ENCODED_LEN: usize = 33;

    /// Constructs an empty accumulator whose sum is zero.
    pub fn new() -> SumAggregator {
        SumAggregator::default()
    }

    /// Resets the sum to zero.
    pub fn reset(&mut self) {
        *self = SumAggregator::default();
    }

    /// Adds `n` to the sum.
    pub fn add(&mut self, n: NumericValue) {
        self.add_wide(I256::from(n.as_packed_int()));
    }

    fn add_wide(&mut self, v: I256) {
        if self.overflowed {
            return;
        }
        match self.sum.checked_add(v) {
            Some(sum) => self.sum = sum,
            None => {
                debug!("numeric sum accumulator overflowed");
                self.overflowed = true;
            }
        }
    }

    /// Adds the sum accumulated by `other` to this sum.
    pub fn merge(&mut self, other: &SumAggregator) {
        if other.overflowed {
            self.overflowed = true;
        } else {
            self.add_wide(other.sum);
        }
    }

    /// Returns the exact scaled sum, or `None` if the accumulator overflowed.
    pub fn sum(&self) -> Option<I256> {
        if self.overflowed {
            None
        } else {
            Some(self.sum)
        }
    }

    /// Returns the sum as a `NumericValue`, failing if it is out of range.
    pub fn finalize(&self) -> Result<NumericValue, OverflowError> {
        let sum = self
            .sum()
            .ok_or_else(|| OverflowError::new("SUM (accumulator overflowed)"))?;
        NumericValue::from_wide(sum).map_err(|_| {
            debug!(%sum, "numeric SUM out of range");
            OverflowError::new(format!("SUM {}", sum))
        })
    }

    /// Returns the sum divided by `count`, rounded half away from zero.
    ///
    /// The average of in-range values is always in range, even when their sum
    /// is not, so this only fails if the accumulator itself overflowed or the
    /// caller passes a count smaller than the number of values added.
    pub fn finalize_average(&self, count: NonZeroU64) -> Result<NumericValue, OverflowError> {
        let sum = self
            .sum()
            .ok_or_else(|| OverflowError::new("AVG (accumulator overflowed)"))?;
        let divisor = I256::from(count.get());
        let mut quotient = sum / divisor;
        let remainder = sum % divisor;
        if remainder.abs() * I256::from(2i32) >= divisor {
            if sum.is_negative() {
                quotient -= I256::ONE;
            } else {
                quotient += I256::ONE;
            }
        }
        NumericValue::from_wide(quotient).map_err(|_| {
            debug!(%sum, count = count.get(), "numeric AVG out of range");
            OverflowError::new(format!("AVG {} / {}", sum, count))
        })
    }

    /// Encodes the accumulator state as 32 little-endian bytes of the sum
    /// followed by one byte holding the overflow flag.
    pub fn to_le_bytes(&self) -> [u8; SumAggregator::ENCODED_LEN] {
        let mut bytes = [0; SumAggregator::ENCODED_LEN];
        bytes[..32].copy_from_slice(&self.sum.to_le_bytes());
        bytes[32] = u8::from(self.overflowed);
        bytes
    }

    /// Decodes an accumulator state produced by
    /// [`to_le_bytes`](SumAggregator::to_le_bytes).
    pub fn from_le_bytes(bytes: &[u8]) -> Result<SumAggregator, InvalidAggregatorStateError> {
        if bytes.len() != SumAggregator::ENCODED_LEN {
            return Err(InvalidAggregatorStateError);
        }
        let sum: [u8; 32] = bytes[..32]
            .try_into()
            .map_err(|_| InvalidAggregatorStateError)?;
        Ok(SumAggregator {
            sum: I256::from_le_bytes(sum),
            overflowed: decode_flag(bytes[32])?,
        })
    }
}

impl Extend<NumericValue> for SumAggregator {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = NumericValue>,
    {
        for n in iter {
            self.add(n);
        }
    }
}

impl FromIterator<NumericValue> for SumAggregator {
    fn from_iter<I>(iter: I) -> SumAggregator
    where
        I: IntoIterator<Item = NumericValue>,
    {
        let mut agg = SumAggregator::new();
        agg.extend(iter);
        agg
    }
}
