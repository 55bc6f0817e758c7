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

//! Native function contracts
//!
//! Two classes of native functions plug into the expression VM:
//!
//! - [`ScalarFunction`]: stateless, evaluated per row from its argument
//!   values alone (pure calls).
//! - [`AggregateFunction`]: stateful, folding rows into per-instance state
//!   through the six-hook contract: `clone_box` creates freshly initialized
//!   state, `accumulate` folds a row, `result` reads the current value,
//!   `reset` returns to the post-init state, `merge` combines the state of a
//!   parallel shard, and `save_state`/`load_state` checkpoint to a byte
//!   stream.

pub mod aggregate;
pub mod registry;
pub mod scalar;

pub use registry::{global_registry, FunctionRegistry};

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{Result, Value};
use crate::executor::ExecutionContext;

/// Trait for scalar (pure) functions
///
/// Implementations hold no per-row state and may be shared freely across
/// threads and programs.
pub trait ScalarFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &'static str;

    /// Evaluate the function with the given arguments
    fn evaluate(&self, ctx: &ExecutionContext, args: &[Value]) -> Result<Value>;
}

/// Trait for aggregate functions
///
/// An implementing struct is both the descriptor and the state: registered
/// prototypes are never accumulated into, they only serve `clone_box`.
/// Per-instance state lives in the boxed clones.
pub trait AggregateFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &'static str;

    /// Accumulate one row's argument values into the state
    ///
    /// NULL handling is per-function; every built-in skips NULL inputs.
    fn accumulate(&mut self, ctx: &ExecutionContext, args: &[Value]) -> Result<()>;

    /// Get the current result without disturbing the state
    fn result(&self) -> Value;

    /// Reset the state to its freshly initialized form
    fn reset(&mut self);

    /// Fold another instance's state for the same function into this one
    ///
    /// Fails when `other` is a different function's state.
    fn merge(&mut self, other: &dyn AggregateFunction) -> Result<()>;

    /// Write the state to a checkpoint stream
    fn save_state(&self, out: &mut dyn Write) -> Result<()>;

    /// Replace the state with one read from a checkpoint stream
    fn load_state(&mut self, input: &mut dyn Read) -> Result<()>;

    /// Create a freshly initialized state (the init hook)
    fn clone_box(&self) -> Box<dyn AggregateFunction>;

    /// Downcast support for [`AggregateFunction::merge`]
    fn as_any(&self) -> &dyn Any;
}

/// Validate the argument count of a native function call
#[macro_export]
macro_rules! validate_arg_count {
    ($args:expr, $name:expr, $expected:expr) => {
        if $args.len() != $expected {
            return Err($crate::core::Error::WrongArgumentCount {
                function: $name,
                expected: $expected,
                got: $args.len(),
            });
        }
    };
}
