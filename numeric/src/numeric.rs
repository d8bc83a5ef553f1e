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

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::ops::Neg;

use ethnum::I256;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

use crate::error::{OverflowError, TryFromNumericError};
use crate::wide::WideInteger;

const TEN_POW_9: i128 = 1_000_000_000;
const TEN_POW_19: i128 = TEN_POW_9 * TEN_POW_9 * 10;
const TEN_POW_38: i128 = TEN_POW_19 * TEN_POW_19;

/// The factor by which a decimal value is multiplied to obtain its scaled
/// representation.
pub(crate) const SCALING_FACTOR: i128 = TEN_POW_9;

/// The largest valid scaled value, `10^38 - 1`.
pub(crate) const MAX_PACKED: i128 = TEN_POW_38 - 1;

/// The smallest valid scaled value. Negation relies on this being exactly
/// `-MAX_PACKED`.
pub(crate) const MIN_PACKED: i128 = -MAX_PACKED;

// Scaling any 64-bit integer stays in range, so the `From` impls for the
// primitive integers need no runtime check.
const_assert!(u64::MAX as i128 * SCALING_FACTOR <= MAX_PACKED);
const_assert!(i64::MIN as i128 * SCALING_FACTOR >= MIN_PACKED);
const_assert!(MIN_PACKED + MAX_PACKED == 0);
// The remainder modulo the scale always fits into an `i32`.
const_assert!(SCALING_FACTOR <= i32::MAX as i128);

/// Reports whether the scaled value `v` lies within the valid range of
/// [`NumericValue`].
pub const fn is_in_range(v: i128) -> bool {
    MIN_PACKED <= v && v <= MAX_PACKED
}

fn out_of_range<T>(v: T) -> OverflowError
where
    T: fmt::Display,
{
    OverflowError::new(format!("scaled value {} is out of range", v))
}

/// A fixed-point decimal number with exactly nine fractional digits.
///
/// This is the in-memory representation of a SQL `NUMERIC` value. The decimal
/// value `d` is stored as the scaled integer `d × 10^9`, split into a high and
/// a low 64-bit word of a two's-complement 128-bit integer. Valid values lie
/// in the closed interval `[-(10^38 - 1), 10^38 - 1]` of scaled integers, i.e.
/// 29 integral and 9 fractional decimal digits.
///
/// Values are immutable. Operations that can leave the valid range return a
/// [`Result`]:
///
/// ```
/// # use std::error::Error;
/// use numeric::NumericValue;
///
/// let a = NumericValue::from(1);
/// let b = NumericValue::from_packed_int(2_500_000_000)?;
/// assert_eq!(a.checked_add(b)?.to_string(), "3.5");
/// assert!(NumericValue::MAX.checked_add(a).is_err());
/// # Ok::<_, Box<dyn Error>>(())
/// ```
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i128", into = "i128"))]
pub struct NumericValue {
    high_bits: u64,
    low_bits: u64,
}

impl NumericValue {
    /// The number of fractional decimal digits.
    pub const DIGITS: u32 = 9;

    /// The scale factor, `10^9`.
    pub const SCALE: i128 = SCALING_FACTOR;

    /// The largest representable value, `99999999999999999999999999999.999999999`.
    pub const MAX: NumericValue = NumericValue::from_packed_int_unchecked(MAX_PACKED);

    /// The smallest representable value, `-99999999999999999999999999999.999999999`.
    pub const MIN: NumericValue = NumericValue::from_packed_int_unchecked(MIN_PACKED);

    /// The value that represents zero.
    pub const ZERO: NumericValue = NumericValue::from_packed_int_unchecked(0);

    /// The value that represents one.
    pub const ONE: NumericValue = NumericValue::from_packed_int_unchecked(SCALING_FACTOR);

    /// Constructs a value representing the number 0.
    pub fn zero() -> NumericValue {
        NumericValue::ZERO
    }

    /// Returns [`NumericValue::MAX`].
    pub fn max_value() -> NumericValue {
        NumericValue::MAX
    }

    /// Returns [`NumericValue::MIN`].
    pub fn min_value() -> NumericValue {
        NumericValue::MIN
    }

    pub(crate) const fn from_packed_int_unchecked(v: i128) -> NumericValue {
        NumericValue {
            high_bits: (v >> 64) as u64,
            low_bits: v as u64,
        }
    }

    /// Constructs a value from its scaled representation, i.e. the decimal
    /// value multiplied by 10<sup>9</sup>.
    ///
    /// Fails if `v` is outside of `[-(10^38 - 1), 10^38 - 1]`.
    pub fn from_packed_int(v: i128) -> Result<NumericValue, OverflowError> {
        if is_in_range(v) {
            Ok(NumericValue::from_packed_int_unchecked(v))
        } else {
            Err(out_of_range(v))
        }
    }

    /// Constructs a value from the high and low 64-bit words of its scaled
    /// representation.
    ///
    /// This is the inverse of [`NumericValue::high_bits`] and
    /// [`NumericValue::low_bits`]. Fails if the words do not form a value in
    /// the valid range.
    pub fn from_high_and_low_bits(high: u64, low: u64) -> Result<NumericValue, OverflowError> {
        NumericValue::from_packed_int(pack(high, low))
    }

    /// Constructs a value from a scaled representation held in a wider
    /// integer type.
    ///
    /// The value is narrowed to 128 bits and validated; it fails if it does
    /// not fit.
    pub fn from_wide<W>(v: W) -> Result<NumericValue, OverflowError>
    where
        W: WideInteger,
    {
        match v.narrow() {
            Some(n) => NumericValue::from_packed_int(n),
            None => Err(out_of_range(v)),
        }
    }

    /// Creates a value from its scaled representation as a little-endian
    /// byte array.
    pub fn from_le_bytes(bytes: [u8; 16]) -> Result<NumericValue, OverflowError> {
        NumericValue::from_packed_int(i128::from_le_bytes(bytes))
    }

    /// Creates a value from its scaled representation as a big-endian byte
    /// array.
    pub fn from_be_bytes(bytes: [u8; 16]) -> Result<NumericValue, OverflowError> {
        NumericValue::from_packed_int(i128::from_be_bytes(bytes))
    }

    /// Creates a value from its scaled representation as a byte array in the
    /// native endianness of the target platform.
    pub fn from_ne_bytes(bytes: [u8; 16]) -> Result<NumericValue, OverflowError> {
        NumericValue::from_packed_int(i128::from_ne_bytes(bytes))
    }

    /// Returns the scaled representation as a little-endian byte array.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        self.as_packed_int().to_le_bytes()
    }

    /// Returns the scaled representation as a big-endian byte array.
    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.as_packed_int().to_be_bytes()
    }

    /// Returns the scaled representation as a byte array in the native
    /// endianness of the target platform.
    pub fn to_ne_bytes(&self) -> [u8; 16] {
        self.as_packed_int().to_ne_bytes()
    }

    /// Returns the scaled representation, i.e. the decimal value multiplied by
    /// 10<sup>9</sup>.
    pub const fn as_packed_int(&self) -> i128 {
        pack(self.high_bits, self.low_bits)
    }

    /// Returns the high 64 bits of the scaled representation.
    pub const fn high_bits(&self) -> u64 {
        self.high_bits
    }

    /// Returns the low 64 bits of the scaled representation.
    pub const fn low_bits(&self) -> u64 {
        self.low_bits
    }

    /// Reports whether the number is zero.
    pub fn is_zero(&self) -> bool {
        self.as_packed_int() == 0
    }

    /// Reports whether the number is less than zero.
    pub fn is_negative(&self) -> bool {
        self.as_packed_int() < 0
    }

    /// Reports whether the number is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.as_packed_int() > 0
    }

    /// Returns `-1`, `0` or `1` according to the sign of the number.
    pub fn signum(&self) -> i32 {
        self.as_packed_int().signum() as i32
    }

    /// Computes the absolute value of the number.
    ///
    /// Unlike the primitive integers this cannot overflow, as the valid range
    /// is symmetric around zero.
    pub fn abs(self) -> NumericValue {
        NumericValue::from_packed_int_unchecked(self.as_packed_int().abs())
    }

    /// Adds `rhs` to the number, failing if the sum is out of range.
    pub fn checked_add(self, rhs: NumericValue) -> Result<NumericValue, OverflowError> {
        I256::from(self.as_packed_int())
            .checked_add(I256::from(rhs.as_packed_int()))
            .and_then(|sum| sum.narrow())
            .filter(|&sum| is_in_range(sum))
            .map(NumericValue::from_packed_int_unchecked)
            .ok_or_else(|| OverflowError::binary(self, "+", rhs))
    }

    /// Subtracts `rhs` from the number, failing if the difference is out of
    /// range.
    pub fn checked_sub(self, rhs: NumericValue) -> Result<NumericValue, OverflowError> {
        I256::from(self.as_packed_int())
            .checked_sub(I256::from(rhs.as_packed_int()))
            .and_then(|diff| diff.narrow())
            .filter(|&diff| is_in_range(diff))
            .map(NumericValue::from_packed_int_unchecked)
            .ok_or_else(|| OverflowError::binary(self, "-", rhs))
    }

    /// Converts the number to the integer type `T`, rounding half away from
    /// zero.
    ///
    /// `2.5` converts to `3`, `-2.5` to `-3` and `2.4` to `2`. Fails if the
    /// rounded value does not fit into `T`.
    ///
    /// ```
    /// # use std::error::Error;
    /// use numeric::NumericValue;
    ///
    /// let n = NumericValue::from_packed_int(-2_500_000_000)?;
    /// assert_eq!(n.to::<i64>()?, -3);
    /// assert!(n.to::<u32>().is_err());
    /// # Ok::<_, Box<dyn Error>>(())
    /// ```
    pub fn to<T>(&self) -> Result<T, TryFromNumericError>
    where
        T: NumericTarget,
    {
        T::from_rounded(self.rounded_integer())
            .ok_or_else(|| TryFromNumericError::new(T::NAME, *self))
    }

    /// Divides the scaled value by the scale factor, rounding half away from
    /// zero.
    pub(crate) fn rounded_integer(&self) -> i128 {
        let v = self.as_packed_int();
        let quotient = v / SCALING_FACTOR;
        let remainder = v % SCALING_FACTOR;
        if remainder.abs() * 2 >= SCALING_FACTOR {
            quotient + v.signum()
        } else {
            quotient
        }
    }

    /// Returns the fractional digits of the number as an integer scaled by
    /// 10<sup>9</sup>.
    ///
    /// The result has the same sign as the number, so `-1.25` yields
    /// `-250000000`.
    pub fn fractional_part(&self) -> i32 {
        (self.as_packed_int() % SCALING_FACTOR) as i32
    }

    /// Reports whether the number has a nonzero fractional part.
    pub fn has_fractional_part(&self) -> bool {
        self.fractional_part() != 0
    }
}

const fn pack(high: u64, low: u64) -> i128 {
    (((high as u128) << 64) | low as u128) as i128
}

/// An integer type that a [`NumericValue`] can be converted to with
/// [`NumericValue::to`].
///
/// This trait is sealed and implemented for `i32`, `u32`, `i64` and `u64`.
pub trait NumericTarget: private::Sealed + Sized {
    /// The name of the type used in error messages.
    const NAME: &'static str;

    /// Narrows an already rounded integer, returning `None` if it does not
    /// fit.
    #[doc(hidden)]
    fn from_rounded(n: i128) -> Option<Self>;
}

pub(crate) mod private {
    pub trait Sealed {}
}

numeric_from_int!(i32, u32, i64, u64);
numeric_to_int!(i32 => "int32", u32 => "uint32", i64 => "int64", u64 => "uint64");

impl TryFrom<i128> for NumericValue {
    type Error = OverflowError;

    fn try_from(v: i128) -> Result<NumericValue, OverflowError> {
        NumericValue::from_packed_int(v)
    }
}

impl From<NumericValue> for i128 {
    fn from(n: NumericValue) -> i128 {
        n.as_packed_int()
    }
}

impl PartialOrd for NumericValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumericValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_packed_int().cmp(&other.as_packed_int())
    }
}

impl Neg for NumericValue {
    type Output = NumericValue;

    fn neg(self) -> NumericValue {
        NumericValue::from_packed_int_unchecked(-self.as_packed_int())
    }
}

impl fmt::Debug for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let v = self.as_packed_int();
        if v < 0 {
            f.write_str("-")?;
        }
        let magnitude = v.unsigned_abs();
        let scale = SCALING_FACTOR as u128;
        write!(f, "{}", magnitude / scale)?;

        let mut frac = magnitude % scale;
        if frac != 0 {
            let mut width = NumericValue::DIGITS as usize;
            while frac % 10 == 0 {
                frac /= 10;
                width -= 1;
            }
            write!(f, ".{:0width$}", frac, width = width)?;
        }
        Ok(())
    }
}
