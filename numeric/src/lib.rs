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

//! numeric is a fixed-point decimal type for SQL `NUMERIC` values.
//!
//! # Introduction
//!
//! A SQL `NUMERIC` value is a decimal number with 29 integral and 9 fractional
//! digits. This crate represents such a value as an integer scaled by
//! 10<sup>9</sup> and stored in 128 bits, which makes every operation exact:
//! there is no rounding in addition or subtraction, and a result that does not
//! fit is reported as an error instead of being wrapped or truncated.
//!
//! The valid range of scaled integers is `[-(10^38 - 1), 10^38 - 1]`, which is
//! narrower than the range of `i128`. The range is symmetric, so negation and
//! absolute value never fail.
//!
//! # Details
//!
//! The main types exposed by this library are as follows:
//!
//!  * [`NumericValue`], the value type. It offers checked addition and
//!    subtraction, rounding conversions to the primitive integer types, and
//!    validated conversions from scaled integers and byte encodings.
//!
//!  * [`CarryAggregator`], which sums values in a native 128-bit accumulator
//!    and counts how often that accumulator wrapped.
//!
//!  * [`SumAggregator`], which sums values in a 256-bit accumulator.
//!
//! Both aggregators accept partial sums outside of the valid range and only
//! check the range of the final sum in their `finalize` methods.
//!
//! # Examples
//!
//! ```
//! # use std::error::Error;
//! use numeric::{CarryAggregator, NumericValue};
//!
//! let price = NumericValue::from_packed_int(19_990_000_000)?;
//! let total = price.checked_add(NumericValue::from(5))?;
//! assert_eq!(total.to_string(), "24.99");
//! assert_eq!(total.to::<i64>()?, 25);
//!
//! let mut sum = CarryAggregator::new();
//! sum.add(NumericValue::MAX);
//! sum.add(NumericValue::MAX);
//! sum.add(NumericValue::MIN);
//! assert_eq!(sum.finalize()?, NumericValue::MAX);
//!
//! # Ok::<_, Box<dyn Error>>(())
//! ```
//!
//! # Features
//!
//!  * `serde` serializes a [`NumericValue`] as its scaled `i128`
//!    representation and validates the range when deserializing.
//!  * `num-traits` implements [`Bounded`], [`ToPrimitive`] and
//!    [`FromPrimitive`] for [`NumericValue`].
//!
//! [`Bounded`]: https://docs.rs/num-traits/latest/num_traits/bounds/trait.Bounded.html
//! [`ToPrimitive`]: https://docs.rs/num-traits/latest/num_traits/cast/trait.ToPrimitive.html
//! [`FromPrimitive`]: https://docs.rs/num-traits/latest/num_traits/cast/trait.FromPrimitive.html

#![deny(missing_debug_implementations, missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aggregate;
#[macro_use]
mod conv;
mod error;
#[cfg(feature = "num-traits")]
mod num;
mod numeric;
mod wide;

pub use aggregate::{CarryAggregator, SumAggregator};
pub use error::{InvalidAggregatorStateError, OverflowError, TryFromNumericError};
pub use numeric::{is_in_range, NumericTarget, NumericValue};
pub use wide::WideInteger;
