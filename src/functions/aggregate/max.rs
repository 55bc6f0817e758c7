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

//! MAX aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{DataType, Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::AggregateFunction;
use crate::validate_arg_count;

use super::{read_f64, read_i64, write_f64, write_i64};

/// Max state - same numeric promotion rule as SUM
#[derive(Debug, Clone, Copy, Default)]
enum MaxState {
    #[default]
    Empty,
    Integer(i64),
    Float(f64),
}

/// MAX aggregate function
///
/// Tracks the maximum of all non-NULL values under numeric coercion. The
/// result is INTEGER while every folded input is an integer; the first FLOAT
/// input (or merge partner) switches it to FLOAT for the instance's
/// remaining life.
///
/// Checkpoint format: type-tag byte + 8-byte payload.
#[derive(Default)]
pub struct MaxFunction {
    state: MaxState,
}

impl AggregateFunction for MaxFunction {
    fn name(&self) -> &'static str {
        "max"
    }

    fn accumulate(&mut self, _ctx: &ExecutionContext, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "max", 1);

        match &args[0] {
            Value::Null => {}
            Value::Integer(i) => {
                self.state = match self.state {
                    MaxState::Empty => MaxState::Integer(*i),
                    MaxState::Integer(max) => MaxState::Integer(max.max(*i)),
                    MaxState::Float(max) => MaxState::Float(max.max(*i as f64)),
                };
            }
            other => {
                let f = other.to_float()?;
                self.state = match self.state {
                    MaxState::Empty => MaxState::Float(f),
                    MaxState::Integer(max) => MaxState::Float((max as f64).max(f)),
                    MaxState::Float(max) => MaxState::Float(max.max(f)),
                };
            }
        }
        Ok(())
    }

    fn result(&self) -> Value {
        match self.state {
            MaxState::Empty => Value::Null,
            MaxState::Integer(max) => Value::Integer(max),
            MaxState::Float(max) => Value::Float(max),
        }
    }

    fn reset(&mut self) {
        self.state = MaxState::Empty;
    }

    fn merge(&mut self, other: &dyn AggregateFunction) -> Result<()> {
        let other = other
            .as_any()
            .downcast_ref::<MaxFunction>()
            .ok_or(Error::AggregateMergeMismatch { function: "max" })?;

        // A partition that saw no values contributes nothing
        self.state = match (self.state, other.state) {
            (state, MaxState::Empty) => state,
            (MaxState::Empty, state) => state,
            (MaxState::Integer(a), MaxState::Integer(b)) => MaxState::Integer(a.max(b)),
            (a, b) => MaxState::Float(max_as_float(a).max(max_as_float(b))),
        };
        Ok(())
    }

    fn save_state(&self, out: &mut dyn Write) -> Result<()> {
        match self.state {
            MaxState::Empty => {
                out.write_all(&[DataType::Null.as_u8()])?;
                write_i64(out, 0)
            }
            MaxState::Integer(max) => {
                out.write_all(&[DataType::Integer.as_u8()])?;
                write_i64(out, max)
            }
            MaxState::Float(max) => {
                out.write_all(&[DataType::Float.as_u8()])?;
                write_f64(out, max)
            }
        }
    }

    fn load_state(&mut self, input: &mut dyn Read) -> Result<()> {
        let mut tag = [0u8; 1];
        input.read_exact(&mut tag)?;

        self.state = match DataType::from_u8(tag[0]) {
            Some(DataType::Null) => {
                read_i64(input)?;
                MaxState::Empty
            }
            Some(DataType::Integer) => MaxState::Integer(read_i64(input)?),
            Some(DataType::Float) => MaxState::Float(read_f64(input)?),
            _ => return Err(Error::UnknownTypeTag(tag[0])),
        };
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(MaxFunction::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn max_as_float(state: MaxState) -> f64 {
    match state {
        MaxState::Empty => f64::NEG_INFINITY,
        MaxState::Integer(max) => max as f64,
        MaxState::Float(max) => max,
    }
}
