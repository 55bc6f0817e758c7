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

//! # Exprvm - SQL expression evaluation engine
//!
//! Exprvm is the scalar/aggregate expression evaluation engine at the heart
//! of a SQL query executor: a typed value representation, compiled
//! expression programs, a tree-walking evaluator, and a six-hook contract
//! that lets aggregate functions accumulate, merge across shards, and
//! checkpoint their state.
//!
//! ## Key pieces
//!
//! - [`Value`] - tagged scalar (NULL/INTEGER/FLOAT/BOOLEAN/TEXT/TIMESTAMP)
//!   with coercion rules and a binary codec
//! - [`ProgramBuilder`] / [`Program`] - immutable compiled expression trees
//!   (literals, input references, conditionals, pure calls, aggregate calls,
//!   regex and LIKE matches)
//! - [`Instance`] - caller-owned per-group evaluation state
//! - [`functions`] - built-in natives (comparison, arithmetic, date/time)
//!   and aggregates (COUNT, SUM, MIN, MAX, AVG) behind a registry
//!
//! ## Quick start
//!
//! ```rust
//! use exprvm::{ExecutionContext, ProgramBuilder, Value};
//!
//! // SELECT sum(col0) over three rows
//! let mut builder = ProgramBuilder::new();
//! let col = builder.input(0);
//! let sum = builder.aggregate("sum", vec![col]).unwrap();
//! let program = builder.build(sum);
//!
//! let ctx = ExecutionContext::new();
//! let mut instance = program.new_instance();
//! for row in [[Value::integer(1)], [Value::integer(2)], [Value::integer(3)]] {
//!     program.accumulate(&ctx, &mut instance, &row).unwrap();
//! }
//! assert_eq!(program.result(&ctx, &instance).unwrap(), Value::Integer(6));
//! ```
//!
//! ## Sharded aggregation
//!
//! A `Program` is immutable after construction and may be shared across
//! threads without synchronization. Each shard owns a private `Instance`;
//! partial states are combined afterward with [`Program::merge`] and can be
//! checkpointed with [`Program::save_state`] / [`Program::load_state`].

pub mod core;
pub mod executor;
pub mod functions;

pub use crate::core::{group_key, DataType, Error, ErrorKind, Result, Value};
pub use crate::executor::{
    CompiledPattern, ExecutionContext, Instance, NodeId, Program, ProgramBuilder,
};
pub use crate::functions::{
    global_registry, AggregateFunction, FunctionRegistry, ScalarFunction,
};
