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

use std::fmt;

use ethnum::I256;

/// A signed integer type at least 128 bits wide that can hold the scaled
/// representation of a [`NumericValue`](crate::NumericValue).
///
/// Used by [`NumericValue::from_wide`](crate::NumericValue::from_wide) and by
/// the aggregators, whose intermediate sums may exceed 128 bits. This trait is
/// sealed and implemented for `i128` and [`ethnum::I256`].
pub trait WideInteger: private::Sealed + Copy + fmt::Display {
    /// Narrows the integer to 128 bits, returning `None` if it does not fit.
    #[doc(hidden)]
    fn narrow(self) -> Option<i128>;
}

mod private {
    pub trait Sealed {}

    impl Sealed for i128 {}
    impl Sealed for ethnum::I256 {}
}

impl WideInteger for i128 {
    fn narrow(self) -> Option<i128> {
        Some(self)
    }
}

impl WideInteger for I256 {
    fn narrow(self) -> Option<i128> {
        if self >= I256::from(i128::MIN) && self <= I256::from(i128::MAX) {
            Some(self.as_i128())
        } else {
            None
        }
    }
}
