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

//! COUNT aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::AggregateFunction;
use crate::validate_arg_count;

use super::{read_varint, write_varint};

/// COUNT aggregate function
///
/// Counts non-NULL values. Checkpoint format: varint counter.
#[derive(Default)]
pub struct CountFunction {
    count: u64,
}

impl AggregateFunction for CountFunction {
    fn name(&self) -> &'static str {
        "count"
    }

    fn accumulate(&mut self, _ctx: &ExecutionContext, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "count", 1);

        if !args[0].is_null() {
            self.count += 1;
        }
        Ok(())
    }

    fn result(&self) -> Value {
        Value::Integer(self.count as i64)
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn merge(&mut self, other: &dyn AggregateFunction) -> Result<()> {
        let other = other
            .as_any()
            .downcast_ref::<CountFunction>()
            .ok_or(Error::AggregateMergeMismatch { function: "count" })?;
        self.count += other.count;
        Ok(())
    }

    fn save_state(&self, out: &mut dyn Write) -> Result<()> {
        write_varint(out, self.count)
    }

    fn load_state(&mut self, input: &mut dyn Read) -> Result<()> {
        self.count = read_varint(input)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(CountFunction::default())
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
    fn test_count_ignores_null() {
        let mut count = CountFunction::default();
        count.accumulate(&ctx(), &[Value::integer(1)]).unwrap();
        count.accumulate(&ctx(), &[Value::null()]).unwrap();
        count.accumulate(&ctx(), &[Value::integer(3)]).unwrap();
        assert_eq!(count.result(), Value::Integer(2));
    }

    #[test]
    fn test_count_empty() {
        let count = CountFunction::default();
        assert_eq!(count.result(), Value::Integer(0));
    }

    #[test]
    fn test_count_reset() {
        let mut count = CountFunction::default();
        count.accumulate(&ctx(), &[Value::text("x")]).unwrap();
        count.reset();
        assert_eq!(count.result(), Value::Integer(0));
    }

    #[test]
    fn test_count_merge() {
        let mut a = CountFunction::default();
        let mut b = CountFunction::default();
        a.accumulate(&ctx(), &[Value::integer(1)]).unwrap();
        b.accumulate(&ctx(), &[Value::integer(2)]).unwrap();
        b.accumulate(&ctx(), &[Value::integer(3)]).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.result(), Value::Integer(3));
    }

    #[test]
    fn test_count_merge_mismatch() {
        let mut a = CountFunction::default();
        let b = super::super::SumFunction::default();
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn test_count_save_load() {
        let mut a = CountFunction::default();
        for i in 0..300 {
            a.accumulate(&ctx(), &[Value::integer(i)]).unwrap();
        }

        let mut buf = Vec::new();
        a.save_state(&mut buf).unwrap();

        let mut b = CountFunction::default();
        b.load_state(&mut buf.as_slice()).unwrap();
        assert_eq!(b.result(), Value::Integer(300));
    }

    #[test]
    fn test_count_wrong_arity() {
        let mut count = CountFunction::default();
        let err = count
            .accumulate(&ctx(), &[Value::integer(1), Value::integer(2)])
            .unwrap_err();
        assert!(matches!(err, Error::WrongArgumentCount { .. }));
    }
}
