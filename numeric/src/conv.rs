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

/// Implements `From<$t>` for `NumericValue` for each primitive integer `$t`.
///
/// The conversion scales the integer by 10<sup>9</sup>. It is only valid for
/// integers no wider than 64 bits, for which the scaled value is statically
/// known to be in range.
macro_rules! numeric_from_int {
    ($($t:ty),*) => {
        $(
            static_assertions::const_assert!(std::mem::size_of::<$t>() <= 8);

            impl From<$t> for $crate::NumericValue {
                fn from(n: $t) -> $crate::NumericValue {
                    $crate::NumericValue::from_packed_int_unchecked(
                        i128::from(n) * $crate::numeric::SCALING_FACTOR,
                    )
                }
            }
        )*
    };
}

/// Implements the rounding conversions from `NumericValue` to each primitive
/// integer `$t`, using `$name` as the type's name in error messages.
///
/// Generates the `NumericTarget` impl, a `TryFrom<NumericValue>` impl, and a
/// `to_$t` convenience method.
macro_rules! numeric_to_int {
    ($($t:ident => $name:literal),*) => {
        $(
            impl $crate::numeric::private::Sealed for $t {}

            impl $crate::NumericTarget for $t {
                const NAME: &'static str = $name;

                fn from_rounded(n: i128) -> Option<$t> {
                    <$t as std::convert::TryFrom<i128>>::try_from(n).ok()
                }
            }

            impl std::convert::TryFrom<$crate::NumericValue> for $t {
                type Error = $crate::TryFromNumericError;

                fn try_from(n: $crate::NumericValue) -> Result<$t, $crate::TryFromNumericError> {
                    n.to::<$t>()
                }
            }

            paste::paste! {
                impl $crate::NumericValue {
                    #[doc = concat!(
                        "Converts the number to an `", stringify!($t),
                        "`, rounding half away from zero.\n\n",
                        "Equivalent to `to::<", stringify!($t), ">()`. The `try_` prefix keeps ",
                        "it apart from `ToPrimitive::to_", stringify!($t), "`, which returns an ",
                        "`Option` instead."
                    )]
                    pub fn [<try_to_ $t>](&self) -> Result<$t, $crate::TryFromNumericError> {
                        self.to::<$t>()
                    }
                }
            }
        )*
    };
}
