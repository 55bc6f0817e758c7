// Copyright 2025 Exprvm Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SUM aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{DataType, Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::AggregateFunction;
use crate::validate_arg_count;

use super::{read_f64, read_varint, write_f64, write_varint};

/// Sum state - tracks whether we have integers or floats
#[derive(Debug, Clone, Copy, Default)]
enum SumState {
    #[default]
    Empty,
    Integer(i64),
    Float(f64),
}

/// SUM aggregate function
///
/// Sums non-NULL values. The result is INTEGER while every folded input is an
/// integer; the first FLOAT input (or merge partner) switches the result type
/// to FLOAT for the instance's remaining life.
///
/// Checkpoint format: varint type tag + 8-byte float total.
#[derive(Default)]
pub struct SumFunction {
    state: SumState,
}

impl AggregateFunction for SumFunction {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn accumulate(&mut self, _ctx: &ExecutionContext, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "sum", 1);

        match &args[0] {
            Value::Null => {}
            Value::Integer(i) => {
                self.state = match self.state {
                    SumState::Empty => SumState::Integer(*i),
                    SumState::Integer(sum) => SumState::Integer(sum + i),
                    SumState::Float(sum) => SumState::Float(sum + *i as f64),
                };
            }
            other => {
                let f = other.to_float()?;
                self.state = match self.state {
                    SumState::Empty => SumState::Float(f),
                    SumState::Integer(sum) => SumState::Float(sum as f64 + f),
                    SumState::Float(sum) => SumState::Float(sum + f),
                };
            }
        }
        Ok(())
    }

    fn result(&self) -> Value {
        match self.state {
            SumState::Empty => Value::Null,
            SumState::Integer(sum) => Value::Integer(sum),
            SumState::Float(sum) => Value::Float(sum),
        }
    }

    fn reset(&mut self) {
        self.state = SumState::Empty;
    }

    fn merge(&mut self, other: &dyn AggregateFunction) -> Result<()> {
        let other = other
            .as_any()
            .downcast_ref::<SumFunction>()
            .ok_or(Error::AggregateMergeMismatch { function: "sum" })?;

        // An empty partition is the identity on either side
        self.state = match (self.state, other.state) {
            (state, SumState::Empty) => state,
            (SumState::Empty, state) => state,
            (SumState::Integer(a), SumState::Integer(b)) => SumState::Integer(a + b),
            (a, b) => SumState::Float(sum_as_float(a) + sum_as_float(b)),
        };
        Ok(())
    }

    fn save_state(&self, out: &mut dyn Write) -> Result<()> {
        let (tag, total) = match self.state {
            SumState::Empty => (DataType::Null, 0.0),
            SumState::Integer(sum) => (DataType::Integer, sum as f64),
            SumState::Float(sum) => (DataType::Float, sum),
        };
        write_varint(out, u64::from(tag.as_u8()))?;
        write_f64(out, total)
    }

    fn load_state(&mut self, input: &mut dyn Read) -> Result<()> {
        let tag = read_varint(input)?;
        let total = read_f64(input)?;

        self.state = match DataType::from_u8(tag as u8) {
            Some(DataType::Null) => SumState::Empty,
            Some(DataType::Integer) => SumState::Integer(total as i64),
            Some(DataType::Float) => SumState::Float(total),
            _ => return Err(Error::UnknownTypeTag(tag as u8)),
        };
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(SumFunction::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn sum_as_float(state: SumState) -> f64 {
    match state {
        SumState::Empty => 0.0,
        SumState::Integer(sum) => sum as f64,
        SumState::Float(sum) => sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    #[test]
    fn test_sum_integers_stay_integer() {
        let mut sum = SumFunction::default();
        sum.accumulate(&ctx(), &[Value::integer(1)]).unwrap();
        sum.accumulate(&ctx(), &[Value::integer(2)]).unwrap();
        sum.accumulate(&ctx(), &[Value::null()]).unwrap();
        sum.accumulate(&ctx(), &[Value::integer(3)]).unwrap();
        assert_eq!(sum.result(), Value::Integer(6));
    }

    #[test]
    fn test_sum_float_promotes() {
        let mut sum = SumFunction::default();
        sum.accumulate(&ctx(), &[Value::integer(1)]).unwrap();
        sum.accumulate(&ctx(), &[Value::float(2.5)]).unwrap();
        sum.accumulate(&ctx(), &[Value::null()]).unwrap();
        sum.accumulate(&ctx(), &[Value::integer(3)]).unwrap();
        assert_eq!(sum.result(), Value::Float(6.5));
    }

    #[test]
    fn test_sum_promotion_is_sticky() {
        let mut sum = SumFunction::default();
        sum.accumulate(&ctx(), &[Value::float(1.0)]).unwrap();
        sum.accumulate(&ctx(), &[Value::integer(2)]).unwrap();
        // Still FLOAT even though the total is integral
        assert_eq!(sum.result(), Value::Float(3.0));
    }

    #[test]
    fn test_sum_empty_is_null() {
        let sum = SumFunction::default();
        assert_eq!(sum.result(), Value::Null);
    }

    #[test]
    fn test_sum_text_coercion() {
        let mut sum = SumFunction::default();
        sum.accumulate(&ctx(), &[Value::text("2.5")]).unwrap();
        assert_eq!(sum.result(), Value::Float(2.5));
        assert!(sum.accumulate(&ctx(), &[Value::text("nope")]).is_err());
    }

    #[test]
    fn test_sum_merge_promotion() {
        let mut a = SumFunction::default();
        let mut b = SumFunction::default();
        a.accumulate(&ctx(), &[Value::integer(4)]).unwrap();
        b.accumulate(&ctx(), &[Value::float(1.5)]).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.result(), Value::Float(5.5));
    }

    #[test]
    fn test_sum_merge_empty_is_identity() {
        let mut a = SumFunction::default();
        a.accumulate(&ctx(), &[Value::integer(4)]).unwrap();

        let b = SumFunction::default();
        a.merge(&b).unwrap();
        assert_eq!(a.result(), Value::Integer(4));

        let mut c = SumFunction::default();
        c.merge(&a).unwrap();
        assert_eq!(c.result(), Value::Integer(4));
    }

    #[test]
    fn test_sum_save_load() {
        let mut a = SumFunction::default();
        a.accumulate(&ctx(), &[Value::integer(7)]).unwrap();

        let mut buf = Vec::new();
        a.save_state(&mut buf).unwrap();

        let mut b = SumFunction::default();
        b.load_state(&mut buf.as_slice()).unwrap();
        assert_eq!(b.result(), Value::Integer(7));

        // Float state keeps its type through the checkpoint
        a.accumulate(&ctx(), &[Value::float(0.5)]).unwrap();
        buf.clear();
        a.save_state(&mut buf).unwrap();
        b.load_state(&mut buf.as_slice()).unwrap();
        assert_eq!(b.result(), Value::Float(7.5));
    }
}
