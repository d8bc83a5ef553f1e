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
use std::num::NonZeroU64;

use ethnum::I256;

use numeric::{CarryAggregator, NumericValue, OverflowError, SumAggregator};

fn n(packed: i128) -> NumericValue {
    NumericValue::from_packed_int(packed).unwrap()
}

type SumResult = Result<NumericValue, OverflowError>;

fn sum_both(values: &[NumericValue]) -> (SumResult, SumResult) {
    let carry: CarryAggregator = values.iter().copied().collect();
    let wide: SumAggregator = values.iter().copied().collect();
    (carry.finalize(), wide.finalize())
}

#[test]
fn test_empty() -> Result<(), Box<dyn Error>> {
    assert_eq!(CarryAggregator::new().finalize()?, NumericValue::ZERO);
    assert_eq!(SumAggregator::new().finalize()?, NumericValue::ZERO);
    assert_eq!(CarryAggregator::new().sum(), Some(I256::ZERO));
    assert_eq!(SumAggregator::new().sum(), Some(I256::ZERO));
    Ok(())
}

#[test]
fn test_simple_sum() -> Result<(), Box<dyn Error>> {
    let values = [n(1_250_000_000), n(-500_000_000), NumericValue::from(10)];
    let (carry, wide) = sum_both(&values);
    assert_eq!(carry?.to_string(), "10.75");
    assert_eq!(wide?.to_string(), "10.75");
    Ok(())
}

#[test]
fn test_sum_with_wraparound() -> Result<(), Box<dyn Error>> {
    // Partial sums leave the 128-bit range several times in both directions,
    // but the final sum is representable.
    let mut values = vec![];
    for _ in 0..10 {
        values.push(NumericValue::MAX);
    }
    for _ in 0..10 {
        values.push(NumericValue::MIN);
    }
    values.push(NumericValue::from(7));
    for _ in 0..5 {
        values.push(NumericValue::MIN);
        values.push(NumericValue::MIN);
        values.push(NumericValue::MAX);
        values.push(NumericValue::MAX);
    }

    let (carry, wide) = sum_both(&values);
    assert_eq!(carry?, NumericValue::from(7));
    assert_eq!(wide?, NumericValue::from(7));

    let mut agg = CarryAggregator::new();
    for _ in 0..3 {
        agg.add(NumericValue::MAX);
    }
    assert_eq!(
        agg.sum(),
        Some(I256::from(NumericValue::MAX.as_packed_int()) * I256::from(3i32))
    );
    Ok(())
}

#[test]
fn test_sum_overflow() -> Result<(), Box<dyn Error>> {
    for values in &[
        vec![NumericValue::MAX, n(1)],
        vec![NumericValue::MIN, n(-1)],
        vec![NumericValue::MAX, NumericValue::MAX],
        vec![
            NumericValue::MAX,
            NumericValue::MAX,
            NumericValue::MAX,
            NumericValue::MIN,
        ],
        vec![NumericValue::MIN; 100],
    ] {
        let (carry, wide) = sum_both(values);
        let carry = carry.unwrap_err();
        let wide = wide.unwrap_err();
        assert!(carry.to_string().starts_with("numeric overflow: SUM "));
        assert_eq!(carry, wide);
    }

    let (carry, _) = sum_both(&[NumericValue::MAX, n(1)]);
    assert_eq!(
        carry.unwrap_err().to_string(),
        "numeric overflow: SUM 100000000000000000000000000000000000000"
    );
    let (_, wide) = sum_both(&[NumericValue::MIN, NumericValue::MIN]);
    assert_eq!(
        wide.unwrap_err().detail(),
        "SUM -199999999999999999999999999999999999998"
    );
    Ok(())
}

#[test]
fn test_sum_at_range_boundary() -> Result<(), Box<dyn Error>> {
    let (carry, wide) = sum_both(&[NumericValue::MAX, NumericValue::ZERO]);
    assert_eq!(carry?, NumericValue::MAX);
    assert_eq!(wide?, NumericValue::MAX);

    let (carry, wide) = sum_both(&[NumericValue::MIN, NumericValue::MIN, NumericValue::MAX]);
    assert_eq!(carry?, NumericValue::MIN);
    assert_eq!(wide?, NumericValue::MIN);
    Ok(())
}

#[test]
fn test_merge() -> Result<(), Box<dyn Error>> {
    let left = vec![NumericValue::MAX; 7];
    let right = vec![NumericValue::MIN; 6];

    let mut carry: CarryAggregator = left.iter().copied().collect();
    carry.merge(&right.iter().copied().collect());
    let mut wide: SumAggregator = left.iter().copied().collect();
    wide.merge(&right.iter().copied().collect());

    assert_eq!(carry.finalize()?, NumericValue::MAX);
    assert_eq!(wide.finalize()?, NumericValue::MAX);

    let all: CarryAggregator = left.iter().chain(right.iter()).copied().collect();
    assert_eq!(carry.sum(), all.sum());
    assert_eq!(wide.sum(), all.sum());

    // Merging two negative partial sums whose lower accumulators wrap.
    let mut carry: CarryAggregator = vec![NumericValue::MIN; 3].into_iter().collect();
    carry.merge(&vec![NumericValue::MIN; 3].into_iter().collect());
    assert_eq!(
        carry.sum(),
        Some(I256::from(NumericValue::MIN.as_packed_int()) * I256::from(6i32))
    );
    Ok(())
}

#[test]
fn test_reset() -> Result<(), Box<dyn Error>> {
    let mut carry = CarryAggregator::new();
    let mut wide = SumAggregator::new();
    for _ in 0..4 {
        carry.add(NumericValue::MAX);
        wide.add(NumericValue::MAX);
    }
    assert!(carry.finalize().is_err());
    assert!(wide.finalize().is_err());

    carry.reset();
    wide.reset();
    carry.add(NumericValue::ONE);
    wide.add(NumericValue::ONE);
    assert_eq!(carry.finalize()?, NumericValue::ONE);
    assert_eq!(wide.finalize()?, NumericValue::ONE);
    Ok(())
}

#[test]
fn test_average() -> Result<(), Box<dyn Error>> {
    fn avg(values: &[NumericValue]) -> Result<NumericValue, OverflowError> {
        let agg: SumAggregator = values.iter().copied().collect();
        let count = NonZeroU64::new(values.len() as u64).unwrap();
        agg.finalize_average(count)
    }

    let one = NumericValue::from(1);
    let two = NumericValue::from(2);
    assert_eq!(avg(&[one, two])?.to_string(), "1.5");
    assert_eq!(avg(&[one, two, two])?.to_string(), "1.666666667");
    assert_eq!(avg(&[-one, -two, -two])?.to_string(), "-1.666666667");
    assert_eq!(avg(&[n(1), n(0)])?, n(1));
    assert_eq!(avg(&[n(-1), n(0)])?, n(-1));
    assert_eq!(avg(&[n(1), n(0), n(0)])?, n(0));

    // The sum is out of range, the average is not.
    assert_eq!(avg(&[NumericValue::MAX; 5])?, NumericValue::MAX);
    assert_eq!(avg(&[NumericValue::MIN; 5])?, NumericValue::MIN);

    let agg: SumAggregator = vec![NumericValue::MAX; 4].into_iter().collect();
    let err = agg.finalize_average(NonZeroU64::new(1).unwrap()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "numeric overflow: AVG 399999999999999999999999999999999999996 / 1"
    );
    Ok(())
}

#[test]
fn test_state_encoding() -> Result<(), Box<dyn Error>> {
    let values = vec![NumericValue::MIN, NumericValue::MIN, n(-17), NumericValue::MIN];

    let carry: CarryAggregator = values.iter().copied().collect();
    let bytes = carry.to_le_bytes();
    assert_eq!(bytes.len(), CarryAggregator::ENCODED_LEN);
    assert_eq!(CarryAggregator::from_le_bytes(&bytes)?, carry);
    assert!(CarryAggregator::from_le_bytes(&bytes[1..]).is_err());
    assert!(CarryAggregator::from_le_bytes(&[]).is_err());

    let wide: SumAggregator = values.iter().copied().collect();
    let mut bytes = wide.to_le_bytes();
    assert_eq!(bytes.len(), SumAggregator::ENCODED_LEN);
    assert_eq!(SumAggregator::from_le_bytes(&bytes)?, wide);
    assert!(SumAggregator::from_le_bytes(&bytes[..32]).is_err());
    bytes[32] = 2;
    assert!(SumAggregator::from_le_bytes(&bytes).is_err());

    let mut bytes = carry.to_le_bytes();
    bytes[24] = 2;
    assert!(CarryAggregator::from_le_bytes(&bytes).is_err());

    let err = CarryAggregator::from_le_bytes(&[0; 3]).unwrap_err();
    assert_eq!(err.to_string(), "invalid numeric aggregator state");
    Ok(())
}

#[test]
fn test_extend() -> Result<(), Box<dyn Error>> {
    let mut carry = CarryAggregator::new();
    carry.extend(vec![NumericValue::ONE; 3]);
    carry.extend(vec![-NumericValue::ONE]);
    assert_eq!(carry.finalize()?, NumericValue::from(2));

    let mut wide = SumAggregator::new();
    wide.extend(vec![NumericValue::ONE; 3]);
    assert_eq!(wide.finalize()?, NumericValue::from(3));
    Ok(())
}

fn carry_state(lower: i128, upper: i64) -> CarryAggregator {
    let mut bytes = [0; CarryAggregator::ENCODED_LEN];
    bytes[..16].copy_from_slice(&lower.to_le_bytes());
    bytes[16..24].copy_from_slice(&upper.to_le_bytes());
    CarryAggregator::from_le_bytes(&bytes).unwrap()
}

#[test]
fn test_carry_counter_overflow() -> Result<(), Box<dyn Error>> {
    // Merging two states whose carry counters sum past the counter's range.
    let mut a = carry_state(0, i64::MAX);
    a.merge(&carry_state(0, i64::MAX));
    assert_eq!(a.sum(), None);
    assert_eq!(
        a.finalize().unwrap_err().to_string(),
        "numeric overflow: SUM (carry counter overflowed)"
    );

    // A wrap of the lower accumulator that pushes the counter past its range.
    let mut a = carry_state(i128::MAX, i64::MAX);
    a.add(NumericValue::ONE);
    assert_eq!(a.sum(), None);
    assert!(a.finalize().is_err());

    let mut a = carry_state(i128::MIN, i64::MIN);
    a.add(-NumericValue::ONE);
    assert_eq!(a.sum(), None);

    // The overflow survives encoding and propagates through merges.
    let decoded = CarryAggregator::from_le_bytes(&a.to_le_bytes())?;
    assert_eq!(decoded.sum(), None);
    let mut b = CarryAggregator::new();
    b.add(NumericValue::ONE);
    b.merge(&decoded);
    assert_eq!(b.sum(), None);
    b.reset();
    assert_eq!(b.sum(), Some(I256::ZERO));

    // Extreme counters that stay in range keep an exact sum.
    let mut a = carry_state(0, i64::MAX);
    a.merge(&carry_state(0, -1));
    assert_eq!(a.sum(), Some(I256::from(i64::MAX - 1) << 128u32));
    Ok(())
}
