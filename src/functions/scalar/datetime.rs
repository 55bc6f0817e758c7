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

//! Date/time natives

use chrono::Utc;

use crate::core::{parse_timestamp, DataType, Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::ScalarFunction;
use crate::validate_arg_count;

const MICROS_PER_MILLI: i64 = 1_000;
const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;
const MICROS_PER_WEEK: i64 = 7 * MICROS_PER_DAY;
const MICROS_PER_YEAR: i64 = 365 * MICROS_PER_DAY;

// ============================================================================
// now
// ============================================================================

/// now - current wall-clock time
#[derive(Default)]
pub struct NowFunction;

impl ScalarFunction for NowFunction {
    fn name(&self) -> &'static str {
        "now"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "now", 0);
        Ok(Value::Timestamp(Utc::now()))
    }
}

// ============================================================================
// from_timestamp
// ============================================================================

/// from_timestamp - convert an epoch-seconds number or a timestamp string to
/// a TIMESTAMP
#[derive(Default)]
pub struct FromTimestampFunction;

impl ScalarFunction for FromTimestampFunction {
    fn name(&self) -> &'static str {
        "from_timestamp"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "from_timestamp", 1);

        let micros = match &args[0] {
            Value::Timestamp(_) => return Ok(args[0].clone()),
            other if other.is_convertible_to_numeric() => {
                (other.to_float()? * MICROS_PER_SECOND as f64) as i64
            }
            Value::Text(s) => return Ok(Value::Timestamp(parse_timestamp(s)?)),
            other => {
                return Err(Error::type_conversion(
                    other.data_type(),
                    DataType::Timestamp,
                    other.to_text(),
                ));
            }
        };

        Value::timestamp_micros(micros)
            .ok_or_else(|| Error::invalid_argument("timestamp out of range"))
    }
}

// ============================================================================
// date_trunc
// ============================================================================

/// date_trunc - truncate a timestamp to a time window
///
/// The window argument is `[count]unit`, e.g. `"hour"`, `"30m"`, `"2d"`.
/// Units: ms, s/sec/second, m/min/minute, h/hour, d/day, w/week,
/// month, y/year (plural forms accepted).
#[derive(Default)]
pub struct DateTruncFunction;

impl ScalarFunction for DateTruncFunction {
    fn name(&self) -> &'static str {
        "date_trunc"
    }

    fn evaluate(&self, _ctx: &ExecutionContext, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "date_trunc", 2);

        let window = parse_time_window(&args[0].to_text())?;

        let micros = match &args[1] {
            Value::Timestamp(t) => t.timestamp_micros(),
            other => other.to_numeric()?.to_integer()?,
        };

        let truncated = micros.div_euclid(window) * window;
        Value::timestamp_micros(truncated)
            .ok_or_else(|| Error::invalid_argument("timestamp out of range"))
    }
}

/// Parse a `[count]unit` time window into microseconds
fn parse_time_window(window: &str) -> Result<i64> {
    let digits = window.bytes().take_while(|b| b.is_ascii_digit()).count();
    let count: i64 = if digits == 0 {
        1
    } else {
        window[..digits]
            .parse()
            .map_err(|_| Error::invalid_argument(format!("invalid time window: {}", window)))?
    };

    if count == 0 {
        return Err(Error::invalid_argument(format!(
            "invalid time window: {}",
            window
        )));
    }

    let unit = match window[digits..].to_ascii_lowercase().as_str() {
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => MICROS_PER_MILLI,
        "s" | "sec" | "secs" | "second" | "seconds" => MICROS_PER_SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MICROS_PER_MINUTE,
        "h" | "hour" | "hours" => MICROS_PER_HOUR,
        "d" | "day" | "days" => MICROS_PER_DAY,
        "w" | "week" | "weeks" => MICROS_PER_WEEK,
        "month" | "months" => 31 * MICROS_PER_DAY,
        "y" | "year" | "years" => MICROS_PER_YEAR,
        other => {
            return Err(Error::invalid_argument(format!(
                "unknown time unit: {}",
                other
            )));
        }
    };

    Ok(count * unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    fn eval(f: &dyn ScalarFunction, args: &[Value]) -> Value {
        f.evaluate(&ctx(), args).unwrap()
    }

    #[test]
    fn test_now_returns_timestamp() {
        let value = eval(&NowFunction, &[]);
        assert_eq!(value.data_type(), DataType::Timestamp);
    }

    #[test]
    fn test_from_timestamp() {
        let value = eval(&FromTimestampFunction, &[Value::integer(1_469_000_000)]);
        assert_eq!(value.to_integer().unwrap(), 1_469_000_000 * 1_000_000);

        // Timestamps pass through untouched
        let ts = Value::timestamp_micros(42).unwrap();
        assert_eq!(eval(&FromTimestampFunction, &[ts.clone()]), ts);

        // Timestamp strings parse
        let value = eval(
            &FromTimestampFunction,
            &[Value::text("2016-07-20 12:00:00")],
        );
        assert_eq!(value.to_text(), "2016-07-20 12:00:00");

        assert!(FromTimestampFunction
            .evaluate(&ctx(), &[Value::text("noon")])
            .is_err());
    }

    #[test]
    fn test_date_trunc_units() {
        let ts = Value::timestamp_micros(3 * MICROS_PER_HOUR + 17 * MICROS_PER_MINUTE + 42).unwrap();

        let hour = eval(&DateTruncFunction, &[Value::text("hour"), ts.clone()]);
        assert_eq!(hour.to_integer().unwrap(), 3 * MICROS_PER_HOUR);

        let half_hour = eval(&DateTruncFunction, &[Value::text("30m"), ts.clone()]);
        assert_eq!(half_hour.to_integer().unwrap(), 3 * MICROS_PER_HOUR);

        let day = eval(&DateTruncFunction, &[Value::text("day"), ts]);
        assert_eq!(day.to_integer().unwrap(), 0);
    }

    #[test]
    fn test_date_trunc_numeric_arg_is_micros() {
        let value = eval(
            &DateTruncFunction,
            &[Value::text("s"), Value::integer(2_500_000)],
        );
        assert_eq!(value.to_integer().unwrap(), 2_000_000);
    }

    #[test]
    fn test_date_trunc_bad_window() {
        let ts = Value::timestamp_micros(0).unwrap();
        assert!(DateTruncFunction
            .evaluate(&ctx(), &[Value::text("fortnight"), ts.clone()])
            .is_err());
        assert!(DateTruncFunction
            .evaluate(&ctx(), &[Value::text("0h"), ts])
            .is_err());
    }
}
