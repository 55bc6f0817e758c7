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

//! Aggregate functions
//!
//! This module provides the built-in aggregates:
//!
//! - [`CountFunction`] - COUNT(column), ignoring NULLs
//! - [`SumFunction`] - SUM(column)
//! - [`MinFunction`] - MIN(column)
//! - [`MaxFunction`] - MAX(column)
//! - [`AvgFunction`] - AVG(column)
//!
//! SUM/MIN/MAX share the numeric promotion rule: state starts empty, stays
//! INTEGER while only integers are folded, and becomes FLOAT for the
//! instance's remaining life once any folded input is FLOAT — including
//! across merges of shard-local state.

mod avg;
mod count;
mod max;
mod min;
mod sum;

pub use avg::AvgFunction;
pub use count::CountFunction;
pub use max::MaxFunction;
pub use min::MinFunction;
pub use sum::SumFunction;

use std::io::{Read, Write};

use crate::core::{Error, Result};

/// Write a LEB128 varint, used by the checkpoint encodings
pub(crate) fn write_varint(out: &mut dyn Write, mut value: u64) -> Result<()> {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.write_all(&[byte])?;
        if value == 0 {
            return Ok(());
        }
    }
}

/// Read a LEB128 varint
pub(crate) fn read_varint(input: &mut dyn Read) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let mut buf = [0u8; 1];
        input.read_exact(&mut buf)?;
        if shift >= 64 {
            return Err(Error::CorruptEncoding("varint too long"));
        }
        value |= u64::from(buf[0] & 0x7f) << shift;
        if buf[0] & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

/// Write an 8-byte little-endian float
pub(crate) fn write_f64(out: &mut dyn Write, value: f64) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Read an 8-byte little-endian float
pub(crate) fn read_f64(input: &mut dyn Read) -> Result<f64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Write an 8-byte little-endian integer
pub(crate) fn write_i64(out: &mut dyn Write, value: i64) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Read an 8-byte little-endian integer
pub(crate) fn read_i64(input: &mut dyn Read) -> Result<i64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        for value in [0u64, 1, 127, 128, 300, u64::from(u32::MAX), u64::MAX] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value).unwrap();
            assert_eq!(read_varint(&mut buf.as_slice()).unwrap(), value);
        }
    }

    #[test]
    fn test_varint_compactness() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 5).unwrap();
        assert_eq!(buf.len(), 1);

        buf.clear();
        write_varint(&mut buf, 300).unwrap();
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_varint_rejects_overlong() {
        // Eleven continuation bytes exceed a u64
        let buf = [0x80u8; 10];
        let mut input: &[u8] = &buf;
        assert!(read_varint(&mut input).is_err());
    }
}
