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

//! Comparison and boolean natives
//!
//! Equality follows the engine's coercion matrix (see [`Value::eq`]). The
//! ordering natives additionally treat NULL as numeric zero against numeric
//! operands, which predicate pushdown depends on; two NULLs order equal.

use std::cmp::Ordering;

use crate::core::{Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::ScalarFunction;
use crate::validate_arg_count;

/// Ordering under the predicate natives' coercion matrix
///
/// Numeric-ish operands (INTEGER/FLOAT/TIMESTAMP/NULL) compare numerically,
/// as i64 when both sides are INTEGER/TIMESTAMP and as floats otherwise,
/// with NULL contributing zero. Any remaining pair with a TEXT side compares
/// as strings. Everything else is incomparable.
fn compare_order(lhs: &Value, rhs: &Value) -> Result<Ordering> {
    let numericish = |v: &Value| {
        matches!(
            v,
            Value::Integer(_) | Value::Float(_) | Value::Timestamp(_) | Value::Null
        )
    };

    if numericish(lhs) && numericish(rhs) {
        if lhs.is_null() && rhs.is_null() {
            return Ok(Ordering::Equal);
        }

        let integral = |v: &Value| matches!(v, Value::Integer(_) | Value::Timestamp(_));
        if integral(lhs) && integral(rhs) {
            return Ok(lhs.to_integer()?.cmp(&rhs.to_integer()?));
        }

        let a = lhs.to_float()?;
        let b = rhs.to_float()?;
        return Ok(a.partial_cmp(&b).unwrap_or(Ordering::Equal));
    }

    if matches!(lhs, Value::Text(_)) || matches!(rhs, Value::Text(_)) {
        return Ok(lhs.to_text().cmp(&rhs.to_text()));
    }

    Err(Error::IncomparableTypes {
        lhs: lhs.data_type(),
        rhs: rhs.data_type(),
    })
}

// ============================================================================
// eq / neq
// ============================================================================

/// eq - equality under the coercion matrix
#[derive(Default)]
pub struct EqFunction;

impl ScalarFunction for EqFunction {
    fn name(&self) -> &'static str {
        "eq"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "eq", 2);
        Ok(Value::Boolean(args[0] == args[1]))
    }
}

/// neq - negated equality
#[derive(Default)]
pub struct NeqFunction;

impl ScalarFunction for NeqFunction {
    fn name(&self) -> &'static str {
        "neq"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "neq", 2);
        Ok(Value::Boolean(args[0] != args[1]))
    }
}

// ============================================================================
// lt / lte / gt / gte
// ============================================================================

/// lt - less than
#[derive(Default)]
pub struct LtFunction;

impl ScalarFunction for LtFunction {
    fn name(&self) -> &'static str {
        "lt"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "lt", 2);
        Ok(Value::Boolean(compare_order(&args[0], &args[1])?.is_lt()))
    }
}

/// lte - less than or equal
#[derive(Default)]
pub struct LteFunction;

impl ScalarFunction for LteFunction {
    fn name(&self) -> &'static str {
        "lte"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "lte", 2);
        Ok(Value::Boolean(compare_order(&args[0], &args[1])?.is_le()))
    }
}

/// gt - greater than
#[derive(Default)]
pub struct GtFunction;

impl ScalarFunction for GtFunction {
    fn name(&self) -> &'static str {
        "gt"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "gt", 2);
        Ok(Value::Boolean(compare_order(&args[0], &args[1])?.is_gt()))
    }
}

/// gte - greater than or equal
#[derive(Default)]
pub struct GteFunction;

impl ScalarFunction for GteFunction {
    fn name(&self) -> &'static str {
        "gte"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "gte", 2);
        Ok(Value::Boolean(compare_order(&args[0], &args[1])?.is_ge()))
    }
}

// ============================================================================
// and / or / neg / is_null
// ============================================================================

/// and - boolean conjunction, operands coerced with to_boolean
#[derive(Default)]
pub struct AndFunction;

impl ScalarFunction for AndFunction {
    fn name(&self) -> &'static str {
        "and"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "and", 2);
        Ok(Value::Boolean(
            args[0].to_boolean()? && args[1].to_boolean()?,
        ))
    }
}

/// or - boolean disjunction, operands coerced with to_boolean
#[derive(Default)]
pub struct OrFunction;

impl ScalarFunction for OrFunction {
    fn name(&self) -> &'static str {
        "or"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "or", 2);
        Ok(Value::Boolean(
            args[0].to_boolean()? || args[1].to_boolean()?,
        ))
    }
}

/// neg - arithmetic negation of numbers, complement of booleans
#[derive(Default)]
pub struct NegFunction;

impl ScalarFunction for NegFunction {
    fn name(&self) -> &'static str {
        "neg"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "neg", 1);

        match &args[0] {
            Value::Integer(i) => Ok(Value::Integer(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            Value::Null => Ok(Value::Null),
            other => Err(Error::invalid_argument(format!(
                "can't negate {}",
                other.data_type()
            ))),
        }
    }
}

/// is_null - NULL test
#[derive(Default)]
pub struct IsNullFunction;

impl ScalarFunction for IsNullFunction {
    fn name(&self) -> &'static str {
        "is_null"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "is_null", 1);
        Ok(Value::Boolean(args[0].is_null()))
    }
}
