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

//! Arithmetic natives
//!
//! All binary operators are NULL-in NULL-out. Two INTEGER operands produce
//! an INTEGER result except `div`, which always produces FLOAT; any FLOAT
//! operand promotes the result to FLOAT. `add` concatenates the text forms
//! when an operand is not numeric; the other operators fail.

use crate::core::{Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::ScalarFunction;
use crate::validate_arg_count;

/// Coerced operands of a binary arithmetic operator
enum NumericPair {
    Null,
    Integers(i64, i64),
    Floats(f64, f64),
}

/// Coerce both operands to numerics, or fail naming the operator
fn numeric_pair(verb: &str, lhs: &Value, rhs: &Value) -> Result<NumericPair> {
    if lhs.is_null() || rhs.is_null() {
        return Ok(NumericPair::Null);
    }

    if !lhs.is_convertible_to_numeric() || !rhs.is_convertible_to_numeric() {
        return Err(Error::invalid_argument(format!(
            "can't {} {} and {}",
            verb,
            lhs.data_type(),
            rhs.data_type()
        )));
    }

    match (lhs.to_numeric()?, rhs.to_numeric()?) {
        (Value::Integer(a), Value::Integer(b)) => Ok(NumericPair::Integers(a, b)),
        (a, b) => Ok(NumericPair::Floats(a.to_float()?, b.to_float()?)),
    }
}

// ============================================================================
// add
// ============================================================================

/// add - addition, or text concatenation when an operand is not numeric
#[derive(Default)]
pub struct AddFunction;

impl ScalarFunction for AddFunction {
    fn name(&self) -> &'static str {
        "add"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "add", 2);

        let (lhs, rhs) = (&args[0], &args[1]);
        if lhs.is_null() || rhs.is_null() {
            return Ok(Value::Null);
        }

        if !lhs.is_convertible_to_numeric() || !rhs.is_convertible_to_numeric() {
            return Ok(Value::text(lhs.to_text() + &rhs.to_text()));
        }

        match numeric_pair("add", lhs, rhs)? {
            NumericPair::Null => Ok(Value::Null),
            NumericPair::Integers(a, b) => Ok(Value::Integer(a.wrapping_add(b))),
            NumericPair::Floats(a, b) => Ok(Value::Float(a + b)),
        }
    }
}

// ============================================================================
// sub / mul / div / mod / pow
// ============================================================================

/// sub - subtraction
#[derive(Default)]
pub struct SubFunction;

impl ScalarFunction for SubFunction {
    fn name(&self) -> &'static str {
        "sub"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "sub", 2);

        match numeric_pair("subtract", &args[0], &args[1])? {
            NumericPair::Null => Ok(Value::Null),
            NumericPair::Integers(a, b) => Ok(Value::Integer(a.wrapping_sub(b))),
            NumericPair::Floats(a, b) => Ok(Value::Float(a - b)),
        }
    }
}

/// mul - multiplication
#[derive(Default)]
pub struct MulFunction;

impl ScalarFunction for MulFunction {
    fn name(&self) -> &'static str {
        "mul"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "mul", 2);

        match numeric_pair("multiply", &args[0], &args[1])? {
            NumericPair::Null => Ok(Value::Null),
            NumericPair::Integers(a, b) => Ok(Value::Integer(a.wrapping_mul(b))),
            NumericPair::Floats(a, b) => Ok(Value::Float(a * b)),
        }
    }
}

/// div - division; always FLOAT
#[derive(Default)]
pub struct DivFunction;

impl ScalarFunction for DivFunction {
    fn name(&self) -> &'static str {
        "div"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "div", 2);

        match numeric_pair("divide", &args[0], &args[1])? {
            NumericPair::Null => Ok(Value::Null),
            NumericPair::Integers(a, b) => Ok(Value::Float(a as f64 / b as f64)),
            NumericPair::Floats(a, b) => Ok(Value::Float(a / b)),
        }
    }
}

/// mod - remainder
#[derive(Default)]
pub struct ModFunction;

impl ScalarFunction for ModFunction {
    fn name(&self) -> &'static str {
        "mod"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "mod", 2);

        match numeric_pair("modulo", &args[0], &args[1])? {
            NumericPair::Null => Ok(Value::Null),
            NumericPair::Integers(a, b) => a
                .checked_rem(b)
                .map(Value::Integer)
                .ok_or_else(|| Error::invalid_argument("modulo by zero")),
            NumericPair::Floats(a, b) => Ok(Value::Float(a % b)),
        }
    }
}

/// pow - exponentiation; computed in floats, INTEGER result for INTEGER
/// operands
#[derive(Default)]
pub struct PowFunction;

impl ScalarFunction for PowFunction {
    fn name(&self) -> &'static str {
        "pow"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "pow", 2);

        match numeric_pair("exponentiate", &args[0], &args[1])? {
            NumericPair::Null => Ok(Value::Null),
            NumericPair::Integers(a, b) => {
                Ok(Value::Integer((a as f64).powf(b as f64) as i64))
            }
            NumericPair::Floats(a, b) => Ok(Value::Float(a.powf(b))),
        }
    }
}

// ============================================================================
// truncate
// ============================================================================

/// truncate - drop the fractional part of a number
#[derive(Default)]
pub struct TruncateFunction;

impl ScalarFunction for TruncateFunction {
    fn name(&self) -> &'static str {
        "truncate"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "truncate", 1);

        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Integer(i) => Ok(Value::Integer(*i)),
            Value::Float(f) => Ok(Value::Integer(*f as i64)),
            other => Err(Error::invalid_argument(format!(
                "can't truncate {}",
                other.data_type()
            ))),
        }
    }
}
