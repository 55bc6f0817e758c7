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

//! AVG aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::AggregateFunction;
use crate::validate_arg_count;

use super::{read_f64, read_varint, write_f64, write_varint};

/// AVG aggregate function
///
/// Arithmetic mean of all non-NULL values under float coercion. Zero rows
/// yield NULL.
///
/// Checkpoint format: varint count + 8-byte float sum.
#[derive(Default)]
pub struct AvgFunction {
    sum: f64,
    count: u64,
}

impl AggregateFunction for AvgFunction {
    fn name(&self) -> &'static str {
        "avg"
    }

    fn accumulate(&mut self, _ctx: &ExecutionContext, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "avg", 1);

        if !args[0].is_null() {
            self.sum += args[0].to_float()?;
            self.count += 1;
        }
        Ok(())
    }

    fn result(&self) -> Value {
        if self.count == 0 {
            return Value::Null;
        }
        Value::Float(self.sum / self.count as f64)
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    fn merge(&mut self, other: &dyn AggregateFunction) -> Result<()> {
        let other = other
            .as_any()
            .downcast_ref::<AvgFunction>()
            .ok_or(Error::AggregateMergeMismatch { function: "avg" })?;
        self.sum += other.sum;
        self.count += other.count;
        Ok(())
    }

    fn save_state(&self, out: &mut dyn Write) -> Result<()> {
        write_varint(out, self.count)?;
        write_f64(out, self.sum)
    }

    fn load_state(&mut self, input: &mut dyn Read) -> Result<()> {
        self.count = read_varint(input)?;
        self.sum = read_f64(input)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(AvgFunction::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    #[test]
    fn test_avg_basic() {
        let mut avg = AvgFunction::default();
        avg.accumulate(&ctx(), &[Value::integer(1)]).unwrap();
        avg.accumulate(&ctx(), &[Value::integer(2)]).unwrap();
        avg.accumulate(&ctx(), &[Value::null()]).unwrap();
        avg.accumulate(&ctx(), &[Value::integer(6)]).unwrap();
        assert_eq!(avg.result(), Value::Float(3.0));
    }

    #[test]
    fn test_avg_empty_is_null() {
        assert_eq!(AvgFunction::default().result(), Value::Null);
    }

    #[test]
    fn test_avg_merge() {
        let mut a = AvgFunction::default();
        let mut b = AvgFunction::default();
        a.accumulate(&ctx(), &[Value::integer(1)]).unwrap();
        b.accumulate(&ctx(), &[Value::integer(2)]).unwrap();
        b.accumulate(&ctx(), &[Value::integer(3)]).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.result(), Value::Float(2.0));
    }

    #[test]
    fn test_avg_save_load() {
        let mut a = AvgFunction::default();
        a.accumulate(&ctx(), &[Value::float(1.5)]).unwrap();
        a.accumulate(&ctx(), &[Value::float(2.5)]).unwrap();

        let mut buf = Vec::new();
        a.save_state(&mut buf).unwrap();

        let mut b = AvgFunction::default();
        b.load_state(&mut buf.as_slice()).unwrap();
        assert_eq!(b.result(), Value::Float(2.0));
    }
}
