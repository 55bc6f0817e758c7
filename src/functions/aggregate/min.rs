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

//! MIN aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{DataType, Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::AggregateFunction;
use crate::validate_arg_count;

use super::{read_f64, read_i64, write_f64, write_i64};

/// Min state - same numeric promotion rule as SUM
#[derive(Debug, Clone, Copy, Default)]
enum MinState {
    #[default]
    Empty,
    Integer(i64),
    Float(f64),
}

/// MIN aggregate function
///
/// Tracks the minimum of all non-NULL values under numeric coercion. The
/// result is INTEGER while every folded input is an integer; the first FLOAT
/// input (or merge partner) switches it to FLOAT for the instance's
/// remaining life.
///
/// Checkpoint format: type-tag byte + 8-byte payload.
#[derive(Default)]
pub struct MinFunction {
    state: MinState,
}

impl AggregateFunction for MinFunction {
    fn name(&self) -> &'static str {
        "min"
    }

    fn accumulate(&mut self, _ctx: &ExecutionContext, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "min", 1);

        match &args[0] {
            Value::Null => {}
            Value::Integer(i) => {
                self.state = match self.state {
                    MinState::Empty => MinState::Integer(*i),
                    MinState::Integer(min) => MinState::Integer(min.min(*i)),
                    MinState::Float(min) => MinState::Float(min.min(*i as f64)),
                };
            }
            other => {
                let f = other.to_float()?;
                self.state = match self.state {
                    MinState::Empty => MinState::Float(f),
                    MinState::Integer(min) => MinState::Float((min as f64).min(f)),
                    MinState::Float(min) => MinState::Float(min.min(f)),
                };
            }
        }
        Ok(())
    }

    fn result(&self) -> Value {
        match self.state {
            MinState::Empty => Value::Null,
            MinState::Integer(min) => Value::Integer(min),
            MinState::Float(min) => Value::Float(min),
        }
    }

    fn reset(&mut self) {
        self.state = MinState::Empty;
    }

    fn merge(&mut self, other: &dyn AggregateFunction) -> Result<()> {
        let other = other
            .as_any()
            .downcast_ref::<MinFunction>()
            .ok_or(Error::AggregateMergeMismatch { function: "min" })?;

        // A partition that saw no values contributes nothing
        self.state = match (self.state, other.state) {
            (state, MinState::Empty) => state,
            (MinState::Empty, state) => state,
            (MinState::Integer(a), MinState::Integer(b)) => MinState::Integer(a.min(b)),
            (a, b) => MinState::Float(min_as_float(a).min(min_as_float(b))),
        };
        Ok(())
    }

    fn save_state(&self, out: &mut dyn Write) -> Result<()> {
        match self.state {
            MinState::Empty => {
                out.write_all(&[DataType::Null.as_u8()])?;
                write_i64(out, 0)
            }
            MinState::Integer(min) => {
                out.write_all(&[DataType::Integer.as_u8()])?;
                write_i64(out, min)
            }
            MinState::Float(min) => {
                out.write_all(&[DataType::Float.as_u8()])?;
                write_f64(out, min)
            }
        }
    }

    fn load_state(&mut self, input: &mut dyn Read) -> Result<()> {
        let mut tag = [0u8; 1];
        input.read_exact(&mut tag)?;

        self.state = match DataType::from_u8(tag[0]) {
            Some(DataType::Null) => {
                read_i64(input)?;
                MinState::Empty
            }
            Some(DataType::Integer) => MinState::Integer(read_i64(input)?),
            Some(DataType::Float) => MinState::Float(read_f64(input)?),
            _ => return Err(Error::UnknownTypeTag(tag[0])),
        };
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(MinFunction::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn min_as_float(state: MinState) -> f64 {
    match state {
        MinState::Empty => f64::INFINITY,
        MinState::Integer(min) => min as f64,
        MinState::Float(min) => min,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    #[test]
    fn test_min_integers() {
        let mut min = MinFunction::default();
        min.accumulate(&ctx(), &[Value::integer(5)]).unwrap();
        min.accumulate(&ctx(), &[Value::integer(2)]).unwrap();
        min.accumulate(&ctx(), &[Value::null()]).unwrap();
        min.accumulate(&ctx(), &[Value::integer(8)]).unwrap();
        assert_eq!(min.result(), Value::Integer(2));
    }

    #[test]
    fn test_min_promotion_is_sticky() {
        let mut min = MinFunction::default();
        min.accumulate(&ctx(), &[Value::float(2.5)]).unwrap();
        min.accumulate(&ctx(), &[Value::integer(1)]).unwrap();
        assert_eq!(min.result(), Value::Float(1.0));
    }

    #[test]
    fn test_min_empty_is_null() {
        assert_eq!(MinFunction::default().result(), Value::Null);
    }

    #[test]
    fn test_min_merge() {
        let mut a = MinFunction::default();
        let mut b = MinFunction::default();
        a.accumulate(&ctx(), &[Value::integer(4)]).unwrap();
        b.accumulate(&ctx(), &[Value::integer(7)]).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.result(), Value::Integer(4));

        // Empty partner leaves the state untouched
        a.merge(&MinFunction::default()).unwrap();
        assert_eq!(a.result(), Value::Integer(4));

        // Float partner promotes
        let mut c = MinFunction::default();
        c.accumulate(&ctx(), &[Value::float(9.5)]).unwrap();
        a.merge(&c).unwrap();
        assert_eq!(a.result(), Value::Float(4.0));
    }

    #[test]
    fn test_min_save_load() {
        let mut a = MinFunction::default();
        a.accumulate(&ctx(), &[Value::integer(-3)]).unwrap();

        let mut buf = Vec::new();
        a.save_state(&mut buf).unwrap();

        let mut b = MinFunction::default();
        b.load_state(&mut buf.as_slice()).unwrap();
        assert_eq!(b.result(), Value::Integer(-3));
    }
}
