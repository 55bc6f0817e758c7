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

//! Execution context
//!
//! The context is an opaque handle threaded through every evaluation call and
//! handed to native functions and aggregate hooks. The engine itself only
//! stores it and passes it along; the one piece of behavior it owns is the
//! optional time-backfill callback used by row-fetching operators.

use std::fmt;
use std::sync::Arc;

use crate::core::{Result, Value};

/// Callback that derives a timestamp for a row that is missing one
pub type TimeBackfillFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// Execution context for expression evaluation
///
/// Cheap to clone; shared state is behind `Arc`.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    /// Optional callback for backfilling a missing time column
    time_backfill: Option<Arc<TimeBackfillFn>>,
}

impl ExecutionContext {
    /// Create an empty execution context
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a time-backfill callback
    pub fn with_time_backfill(
        mut self,
        callback: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.time_backfill = Some(Arc::new(callback));
        self
    }

    /// Run the time-backfill callback for a row
    ///
    /// A failing callback never aborts the caller's fetch: the error is
    /// logged and treated as "no backfill". Returns None when no callback is
    /// configured or the callback failed.
    pub fn backfill_time(&self, row: &[Value]) -> Option<Value> {
        let callback = self.time_backfill.as_ref()?;
        match callback(row) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("time backfill failed, skipping: {}", err);
                None
            }
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("time_backfill", &self.time_backfill.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    #[test]
    fn test_backfill_absent() {
        let ctx = ExecutionContext::new();
        assert_eq!(ctx.backfill_time(&[]), None);
    }

    #[test]
    fn test_backfill_success() {
        let ctx = ExecutionContext::new().with_time_backfill(|row| Ok(row[0].clone()));
        let row = [Value::integer(123)];
        assert_eq!(ctx.backfill_time(&row), Some(Value::integer(123)));
    }

    #[test]
    fn test_backfill_failure_is_swallowed() {
        let ctx = ExecutionContext::new()
            .with_time_backfill(|_| Err(Error::invalid_argument("no time column")));
        assert_eq!(ctx.backfill_time(&[Value::integer(1)]), None);
    }
}
