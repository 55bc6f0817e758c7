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

//! Scalar (pure) native functions
//!
//! - [`comparison`]: eq, neq, lt, lte, gt, gte, and, or, neg, is_null
//! - [`math`]: add, sub, mul, div, mod, pow, truncate
//! - [`datetime`]: now, from_timestamp, date_trunc

pub mod comparison;
pub mod datetime;
pub mod math;

pub use comparison::{
    AndFunction, EqFunction, GtFunction, GteFunction, IsNullFunction, LtFunction, LteFunction,
    NegFunction, NeqFunction, OrFunction,
};
pub use datetime::{DateTruncFunction, FromTimestampFunction, NowFunction};
pub use math::{
    AddFunction, DivFunction, ModFunction, MulFunction, PowFunction, SubFunction, TruncateFunction,
};
