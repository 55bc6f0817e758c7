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

//! Function registry
//!
//! Maps lowercase function names to scalar functions and aggregate
//! prototypes. Program builders resolve call nodes through the global
//! registry; custom functions can be registered at startup.

use std::sync::{Arc, OnceLock, RwLock};

use rustc_hash::FxHashMap;

use super::aggregate::{AvgFunction, CountFunction, MaxFunction, MinFunction, SumFunction};
use super::scalar::{
    AddFunction, AndFunction, DateTruncFunction, DivFunction, EqFunction, FromTimestampFunction,
    GtFunction, GteFunction, IsNullFunction, LtFunction, LteFunction, ModFunction, MulFunction,
    NegFunction, NeqFunction, NowFunction, OrFunction, PowFunction, SubFunction, TruncateFunction,
};
use super::{AggregateFunction, ScalarFunction};

/// Global function registry instance
static GLOBAL_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Get the global function registry
#[inline]
pub fn global_registry() -> &'static FunctionRegistry {
    GLOBAL_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Function registry for native functions
pub struct FunctionRegistry {
    /// Scalar functions, shared directly
    scalar_functions: RwLock<FxHashMap<String, Arc<dyn ScalarFunction>>>,
    /// Aggregate prototypes; lookups hand out fresh state via `clone_box`
    aggregate_functions: RwLock<FxHashMap<String, Box<dyn AggregateFunction>>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions registered
    pub fn new() -> Self {
        let registry = Self {
            scalar_functions: RwLock::new(FxHashMap::default()),
            aggregate_functions: RwLock::new(FxHashMap::default()),
        };

        // Comparison and boolean natives
        registry.register_scalar(Arc::new(EqFunction));
        registry.register_scalar(Arc::new(NeqFunction));
        registry.register_scalar(Arc::new(LtFunction));
        registry.register_scalar(Arc::new(LteFunction));
        registry.register_scalar(Arc::new(GtFunction));
        registry.register_scalar(Arc::new(GteFunction));
        registry.register_scalar(Arc::new(AndFunction));
        registry.register_scalar(Arc::new(OrFunction));
        registry.register_scalar(Arc::new(NegFunction));
        registry.register_scalar(Arc::new(IsNullFunction));

        // Arithmetic natives
        registry.register_scalar(Arc::new(AddFunction));
        registry.register_scalar(Arc::new(SubFunction));
        registry.register_scalar(Arc::new(MulFunction));
        registry.register_scalar(Arc::new(DivFunction));
        registry.register_scalar(Arc::new(ModFunction));
        registry.register_scalar(Arc::new(PowFunction));
        registry.register_scalar(Arc::new(TruncateFunction));

        // Date/time natives
        registry.register_scalar(Arc::new(NowFunction));
        registry.register_scalar(Arc::new(FromTimestampFunction));
        registry.register_scalar(Arc::new(DateTruncFunction));

        // Aggregates
        registry.register_aggregate(Box::new(CountFunction::default()));
        registry.register_aggregate(Box::new(SumFunction::default()));
        registry.register_aggregate(Box::new(MinFunction::default()));
        registry.register_aggregate(Box::new(MaxFunction::default()));
        registry.register_aggregate(Box::new(AvgFunction::default()));

        registry
    }

    /// Register a scalar function under its own name
    pub fn register_scalar(&self, function: Arc<dyn ScalarFunction>) {
        let mut map = self
            .scalar_functions
            .write()
            .expect("scalar function registry lock poisoned");
        map.insert(function.name().to_lowercase(), function);
    }

    /// Register an aggregate prototype under its own name
    pub fn register_aggregate(&self, prototype: Box<dyn AggregateFunction>) {
        let mut map = self
            .aggregate_functions
            .write()
            .expect("aggregate function registry lock poisoned");
        map.insert(prototype.name().to_lowercase(), prototype);
    }

    /// Look up a scalar function by name (case-insensitive)
    pub fn get_scalar(&self, name: &str) -> Option<Arc<dyn ScalarFunction>> {
        let map = self
            .scalar_functions
            .read()
            .expect("scalar function registry lock poisoned");
        map.get(&name.to_lowercase()).cloned()
    }

    /// Get freshly initialized state for an aggregate by name
    /// (case-insensitive)
    pub fn get_aggregate(&self, name: &str) -> Option<Box<dyn AggregateFunction>> {
        let map = self
            .aggregate_functions
            .read()
            .expect("aggregate function registry lock poisoned");
        map.get(&name.to_lowercase()).map(|f| f.clone_box())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = FunctionRegistry::new();
        assert!(registry.get_scalar("add").is_some());
        assert!(registry.get_scalar("ADD").is_some());
        assert!(registry.get_aggregate("sum").is_some());
        assert!(registry.get_aggregate("COUNT").is_some());
        assert!(registry.get_scalar("no_such_fn").is_none());
        assert!(registry.get_aggregate("no_such_fn").is_none());
    }

    #[test]
    fn test_aggregate_lookup_returns_fresh_state() {
        let registry = FunctionRegistry::new();
        let ctx = crate::executor::ExecutionContext::new();

        let mut a = registry.get_aggregate("count").unwrap();
        a.accumulate(&ctx, &[crate::core::Value::integer(1)]).unwrap();

        let b = registry.get_aggregate("count").unwrap();
        assert_eq!(b.result(), crate::core::Value::integer(0));
        assert_eq!(a.result(), crate::core::Value::integer(1));
    }
}
