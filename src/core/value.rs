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

//! Runtime value representation
//!
//! `Value` is the tagged scalar used throughout the engine. Text owns its
//! buffer through `Arc<str>`, so copies are cheap and there is no manual
//! buffer management on any copy or reassignment path. All other variants are
//! inline.
//!
//! Conversions are total within their source type and fail with a type error
//! across incompatible ones. Equality follows a fixed coercion matrix, see
//! [`Value::eq`].

use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::error::{Error, Result};
use super::types::DataType;

/// Timestamp formats supported for parsing, more specific formats first
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z", // RFC3339 with fractional seconds
    "%Y-%m-%dT%H:%M:%S%:z",    // RFC3339
    "%Y-%m-%d %H:%M:%S%.f",    // SQL-style with fractional seconds
    "%Y-%m-%d %H:%M:%S",       // SQL-style
];

/// A runtime value
///
/// Exactly one variant is active at a time. Cloning is cheap for every
/// variant; `Text` shares its buffer.
#[derive(Debug, Clone)]
pub enum Value {
    /// NULL value
    Null,

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// Boolean value
    Boolean(bool),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),

    /// Timestamp (UTC, microsecond precision)
    Timestamp(DateTime<Utc>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a NULL value
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a float value
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Create a timestamp value
    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }

    /// Create a timestamp value from microseconds since the Unix epoch
    ///
    /// Returns None if the microsecond count is outside chrono's
    /// representable range.
    pub fn timestamp_micros(micros: i64) -> Option<Self> {
        DateTime::from_timestamp_micros(micros).map(Value::Timestamp)
    }

    // =========================================================================
    // Type inspection
    // =========================================================================

    /// Get the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Boolean(_) => DataType::Boolean,
            Value::Text(_) => DataType::Text,
            Value::Timestamp(_) => DataType::Timestamp,
        }
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is INTEGER or FLOAT
    pub fn is_numeric(&self) -> bool {
        self.data_type().is_numeric()
    }

    /// Returns true if this value converts to a numeric without a type error
    ///
    /// Text qualifies only when it lexically looks like an integer or float
    /// literal; booleans and NULL do not qualify.
    pub fn is_convertible_to_numeric(&self) -> bool {
        match self {
            Value::Integer(_) | Value::Float(_) | Value::Timestamp(_) => true,
            Value::Text(s) => is_integer_literal(s) || is_float_literal(s),
            _ => false,
        }
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Convert to i64
    ///
    /// INTEGER passes through; TIMESTAMP yields microseconds since the epoch;
    /// FLOAT truncates; BOOLEAN yields 0/1; NULL yields 0; TEXT is parsed
    /// (integer first, then float with truncation) or fails.
    pub fn to_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(v) => Ok(*v),
            Value::Timestamp(t) => Ok(t.timestamp_micros()),
            Value::Float(v) => Ok(*v as i64),
            Value::Boolean(b) => Ok(i64::from(*b)),
            Value::Null => Ok(0),
            Value::Text(s) => s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .ok_or_else(|| {
                    Error::type_conversion(DataType::Text, DataType::Integer, s.as_ref())
                }),
        }
    }

    /// Convert to f64, same matrix as [`Value::to_integer`]
    pub fn to_float(&self) -> Result<f64> {
        match self {
            Value::Integer(v) => Ok(*v as f64),
            Value::Timestamp(t) => Ok(t.timestamp_micros() as f64),
            Value::Float(v) => Ok(*v),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Null => Ok(0.0),
            Value::Text(s) => s.parse::<f64>().map_err(|_| {
                Error::type_conversion(DataType::Text, DataType::Float, s.as_ref())
            }),
        }
    }

    /// Convert to bool
    ///
    /// INTEGER/FLOAT are true when positive; TEXT is always true, including
    /// the empty string; NULL is false; TIMESTAMP fails.
    pub fn to_boolean(&self) -> Result<bool> {
        match self {
            Value::Integer(v) => Ok(*v > 0),
            Value::Float(v) => Ok(*v > 0.0),
            Value::Boolean(b) => Ok(*b),
            Value::Text(_) => Ok(true),
            Value::Null => Ok(false),
            Value::Timestamp(t) => Err(Error::type_conversion(
                DataType::Timestamp,
                DataType::Boolean,
                t.format("%Y-%m-%d %H:%M:%S").to_string(),
            )),
        }
    }

    /// Convert to the canonical display string; total over all variants
    ///
    /// NULL renders as `"NULL"`, timestamps as `%Y-%m-%d %H:%M:%S`.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => format_float(*v),
            Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Text(s) => s.to_string(),
            Value::Timestamp(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Normalize to INTEGER or FLOAT
    ///
    /// Numerics pass through; integer-looking text becomes INTEGER, float-
    /// looking text becomes FLOAT; timestamps become their microsecond count.
    pub fn to_numeric(&self) -> Result<Value> {
        match self {
            Value::Integer(_) | Value::Float(_) => Ok(self.clone()),
            Value::Timestamp(t) => Ok(Value::Integer(t.timestamp_micros())),
            Value::Text(s) if is_integer_literal(s) => Ok(Value::Integer(self.to_integer()?)),
            Value::Text(s) if is_float_literal(s) => Ok(Value::Float(self.to_float()?)),
            _ => Err(Error::type_conversion(
                self.data_type(),
                DataType::Float,
                self.to_text(),
            )),
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values for ordering under the engine's coercion matrix
    ///
    /// Same precedence as equality: text coerces both sides to strings,
    /// booleans only order against booleans, floats promote the other side,
    /// integers and timestamps order as i64. NULL orders equal to NULL only;
    /// any other pairing with NULL is incomparable here (the predicate
    /// natives implement their own NULL-as-zero ordering against numerics).
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        if self.is_null() || other.is_null() {
            if self.is_null() && other.is_null() {
                return Ok(Ordering::Equal);
            }
            return Err(Error::IncomparableTypes {
                lhs: self.data_type(),
                rhs: other.data_type(),
            });
        }

        if matches!(self, Value::Text(_)) || matches!(other, Value::Text(_)) {
            return Ok(self.to_text().cmp(&other.to_text()));
        }

        if matches!(self, Value::Boolean(_)) || matches!(other, Value::Boolean(_)) {
            return match (self, other) {
                (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
                _ => Err(Error::IncomparableTypes {
                    lhs: self.data_type(),
                    rhs: other.data_type(),
                }),
            };
        }

        if matches!(self, Value::Float(_)) || matches!(other, Value::Float(_)) {
            return Ok(compare_floats(self.to_float()?, other.to_float()?));
        }

        // INTEGER and TIMESTAMP compare as 64-bit integers
        Ok(self.to_integer()?.cmp(&other.to_integer()?))
    }

    // =========================================================================
    // Binary codec
    // =========================================================================

    /// Encode this value to a byte stream
    ///
    /// Format: 1-byte type tag (the `DataType` discriminant), then payload —
    /// TEXT: u32-LE length + bytes; FLOAT: 8-byte IEEE754 LE; INTEGER: 8-byte
    /// LE; TIMESTAMP: 8-byte LE microseconds; BOOLEAN: 1 byte; NULL: empty.
    pub fn encode(&self, out: &mut dyn Write) -> Result<()> {
        out.write_all(&[self.data_type().as_u8()])?;

        match self {
            Value::Null => {}
            Value::Integer(v) => out.write_all(&v.to_le_bytes())?,
            Value::Float(v) => out.write_all(&v.to_le_bytes())?,
            Value::Boolean(b) => out.write_all(&[u8::from(*b)])?,
            Value::Text(s) => {
                out.write_all(&(s.len() as u32).to_le_bytes())?;
                out.write_all(s.as_bytes())?;
            }
            Value::Timestamp(t) => out.write_all(&t.timestamp_micros().to_le_bytes())?,
        }

        Ok(())
    }

    /// Decode a value from a byte stream
    pub fn decode(input: &mut dyn Read) -> Result<Value> {
        let mut tag = [0u8; 1];
        input.read_exact(&mut tag)?;

        match DataType::from_u8(tag[0]) {
            Some(DataType::Null) => Ok(Value::Null),
            Some(DataType::Integer) => {
                let mut buf = [0u8; 8];
                input.read_exact(&mut buf)?;
                Ok(Value::Integer(i64::from_le_bytes(buf)))
            }
            Some(DataType::Float) => {
                let mut buf = [0u8; 8];
                input.read_exact(&mut buf)?;
                Ok(Value::Float(f64::from_le_bytes(buf)))
            }
            Some(DataType::Boolean) => {
                let mut buf = [0u8; 1];
                input.read_exact(&mut buf)?;
                Ok(Value::Boolean(buf[0] != 0))
            }
            Some(DataType::Text) => {
                let mut len_buf = [0u8; 4];
                input.read_exact(&mut len_buf)?;
                let len = u32::from_le_bytes(len_buf) as usize;
                let mut buf = vec![0u8; len];
                input.read_exact(&mut buf)?;
                let s = String::from_utf8(buf)
                    .map_err(|_| Error::CorruptEncoding("invalid utf-8 in text payload"))?;
                Ok(Value::text(s))
            }
            Some(DataType::Timestamp) => {
                let mut buf = [0u8; 8];
                input.read_exact(&mut buf)?;
                Value::timestamp_micros(i64::from_le_bytes(buf))
                    .ok_or(Error::CorruptEncoding("timestamp out of range"))
            }
            None => Err(Error::UnknownTypeTag(tag[0])),
        }
    }
}

/// Derive a grouping key from a row of values
///
/// Concatenates the per-column display forms with NUL separators; two rows
/// produce the same key exactly when every column renders identically.
pub fn group_key(row: &[Value]) -> Vec<u8> {
    let mut key = Vec::new();
    for value in row {
        key.extend_from_slice(value.to_text().as_bytes());
        key.push(0);
    }
    key
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl PartialEq for Value {
    /// Equality under the engine's coercion matrix
    ///
    /// Precedence: NULL equals only NULL (the symmetric policy; `NULL == 0`
    /// is false); if either side is TEXT both sides compare as strings; a
    /// BOOLEAN equals only another BOOLEAN; if either side is FLOAT both
    /// compare as floats; INTEGER and TIMESTAMP compare as 64-bit integers.
    fn eq(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }

        if matches!(self, Value::Text(_)) || matches!(other, Value::Text(_)) {
            return self.to_text() == other.to_text();
        }

        if matches!(self, Value::Boolean(_)) || matches!(other, Value::Boolean(_)) {
            return match (self, other) {
                (Value::Boolean(a), Value::Boolean(b)) => a == b,
                _ => false,
            };
        }

        if matches!(self, Value::Float(_)) || matches!(other, Value::Float(_)) {
            // Coercion from the remaining variants cannot fail
            return self.to_float().unwrap_or(f64::NAN) == other.to_float().unwrap_or(f64::NAN);
        }

        match (self.to_integer(), other.to_integer()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

// =========================================================================
// From implementations
// =========================================================================

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Arc::from(v.as_str()))
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

// =========================================================================
// Helper functions
// =========================================================================

/// Parse a timestamp string with multiple format support
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc));
        }
        // Naive datetime, assume UTC
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let datetime = date.and_hms_opt(0, 0, 0).unwrap();
        return Ok(Utc.from_utc_datetime(&datetime));
    }

    Err(Error::type_conversion(
        DataType::Text,
        DataType::Timestamp,
        s,
    ))
}

/// Format a float value consistently
fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        // Integer-like float, format without decimal
        format!("{:.0}", v)
    } else {
        let s = format!("{:?}", v);
        if s.contains('.') && !s.contains('e') && !s.contains('E') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    }
}

/// Compare two floats with NaN ordered above everything
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Lexical check: optional sign followed by digits only
fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Lexical check: optional sign, digits, at most one decimal point
fn is_float_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() {
        return false;
    }

    let mut seen_dot = false;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => {}
            b'.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    true
}
