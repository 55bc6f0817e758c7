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

//! Error types for the expression engine
//!
//! All failures propagate synchronously from the triggering call; there is no
//! retry and no rollback. A failed evaluate/accumulate leaves the instance
//! mutated exactly as far as completed sub-evaluations reached.

use thiserror::Error;

use super::types::DataType;

/// Result type alias for expression engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error classification
///
/// Every [`Error`] variant maps to exactly one kind; callers that only need
/// the taxonomy (e.g. to translate into a wire status) use [`Error::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An impossible value conversion
    Type,
    /// Wrong arity, out-of-range row index, corrupt encoding, and similar
    Runtime,
    /// An aggregate expression evaluated without an instance
    IllegalArgument,
}

/// Main error type for expression evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Type errors
    // =========================================================================
    /// Value cannot be converted to the requested type
    #[error("can't convert {from} '{value}' to {to}")]
    TypeConversion {
        from: DataType,
        to: DataType,
        value: String,
    },

    /// Two values cannot be compared
    #[error("can't compare {lhs} with {rhs}")]
    IncomparableTypes { lhs: DataType, rhs: DataType },

    // =========================================================================
    // Runtime errors
    // =========================================================================
    /// Input reference beyond the supplied row
    #[error("invalid row index {index}, row has {argc} columns")]
    RowIndexOutOfRange { index: usize, argc: usize },

    /// Native function invoked with the wrong number of arguments
    #[error("wrong number of arguments for {function}(), expected {expected}, got {got}")]
    WrongArgumentCount {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    /// Function name not present in the registry
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Decoder hit a type tag outside the known set
    #[error("corrupt value encoding: unknown type tag {0}")]
    UnknownTypeTag(u8),

    /// Decoder ran out of bytes or hit malformed payload data
    #[error("corrupt value encoding: {0}")]
    CorruptEncoding(&'static str),

    /// Invalid argument for a native function
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// LIKE/regex pattern failed to compile
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Merge called across states of different aggregate functions
    #[error("can't merge {function}() state with a different function's state")]
    AggregateMergeMismatch { function: &'static str },

    /// Stream failure during save/load
    #[error("io error: {0}")]
    Io(String),

    // =========================================================================
    // Illegal argument errors
    // =========================================================================
    /// Aggregate expression evaluated without an instance pointer
    #[error("aggregate expression evaluated without an instance")]
    InstanceRequired,
}

impl Error {
    /// Map this error onto the engine's coarse taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TypeConversion { .. } | Error::IncomparableTypes { .. } => ErrorKind::Type,
            Error::InstanceRequired => ErrorKind::IllegalArgument,
            _ => ErrorKind::Runtime,
        }
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a TypeConversion error for a value described by its type and
    /// display form
    pub fn type_conversion(from: DataType, to: DataType, value: impl Into<String>) -> Self {
        Error::TypeConversion {
            from,
            to,
            value: value.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::type_conversion(DataType::Timestamp, DataType::Boolean, "0");
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = Error::RowIndexOutOfRange { index: 3, argc: 2 };
        assert_eq!(err.kind(), ErrorKind::Runtime);

        assert_eq!(Error::InstanceRequired.kind(), ErrorKind::IllegalArgument);
    }

    #[test]
    fn test_error_display() {
        let err = Error::WrongArgumentCount {
            function: "sum",
            expected: 1,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "wrong number of arguments for sum(), expected 1, got 3"
        );

        let err = Error::type_conversion(DataType::Text, DataType::Integer, "abc");
        assert_eq!(err.to_string(), "can't convert TEXT 'abc' to INTEGER");
    }
}
