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

use std::error::Error;
use std::fmt;

use crate::numeric::NumericValue;

/// An error indicating that a value, or the result of an operation, lies
/// outside the range of [`NumericValue`].
///
/// The error carries a description of the offending operands, e.g.
/// `99999999999999999999999999999.999999999 + 1`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OverflowError {
    detail: String,
}

impl OverflowError {
    pub(crate) fn new<S>(detail: S) -> OverflowError
    where
        S: Into<String>,
    {
        OverflowError {
            detail: detail.into(),
        }
    }

    /// Constructs an error for a binary operation `lhs op rhs`.
    pub(crate) fn binary(lhs: NumericValue, op: &str, rhs: NumericValue) -> OverflowError {
        OverflowError::new(format!("{} {} {}", lhs, op, rhs))
    }

    /// Returns the description of the operands that caused the overflow.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for OverflowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "numeric overflow: {}", self.detail)
    }
}

impl Error for OverflowError {}

/// An error indicating that a value cannot be converted to a primitive integer
/// type.
///
/// The value is rounded half away from zero before the conversion, so this
/// error means the rounded integer does not fit into the target type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TryFromNumericError {
    target: &'static str,
    value: NumericValue,
}

impl TryFromNumericError {
    pub(crate) fn new(target: &'static str, value: NumericValue) -> TryFromNumericError {
        TryFromNumericError { target, value }
    }

    /// Returns the name of the type the conversion targeted, e.g. `int64`.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Returns the value that failed to convert.
    pub fn value(&self) -> NumericValue {
        self.value
    }
}

impl fmt::Display for TryFromNumericError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} out of range: {}", self.target, self.value)
    }
}

impl Error for TryFromNumericError {}

/// An error indicating that a serialized aggregator state is malformed.
#[derive(Debug, Eq, PartialEq)]
pub struct InvalidAggregatorStateError;

impl fmt::Display for InvalidAggregatorStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid numeric aggregator state")
    }
}

impl Error for InvalidAggregatorStateError {}
