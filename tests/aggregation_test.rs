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

//! Aggregation tests
//!
//! Tests the aggregate path end to end: accumulate/result over programs,
//! merge associativity across partition splits, reset/save/load semantics,
//! and mixed scalar/aggregate select lists.

use exprvm::{ExecutionContext, Instance, Program, ProgramBuilder, Value};

fn ctx() -> ExecutionContext {
    ExecutionContext::new()
}

/// Build `aggregate(col0)` over single-column rows
fn single_aggregate(name: &str) -> Program {
    let mut b = ProgramBuilder::new();
    let col = b.input(0);
    let root = b.aggregate(name, vec![col]).unwrap();
    b.build(root)
}

fn accumulate_all(program: &Program, values: &[Value]) -> Instance {
    let ctx = ctx();
    let mut instance = program.new_instance();
    for value in values {
        program
            .accumulate(&ctx, &mut instance, std::slice::from_ref(value))
            .unwrap();
    }
    instance
}

#[test]
fn test_count_ignores_null() {
    let program = single_aggregate("count");
    let instance = accumulate_all(
        &program,
        &[Value::integer(1), Value::null(), Value::integer(3)],
    );
    assert_eq!(
        program.result(&ctx(), &instance).unwrap(),
        Value::Integer(2)
    );
}

#[test]
fn test_sum_integer_and_promoted() {
    let program = single_aggregate("sum");

    let instance = accumulate_all(
        &program,
        &[
            Value::integer(1),
            Value::integer(2),
            Value::null(),
            Value::integer(3),
        ],
    );
    assert_eq!(
        program.result(&ctx(), &instance).unwrap(),
        Value::Integer(6)
    );

    let instance = accumulate_all(
        &program,
        &[
            Value::integer(1),
            Value::float(2.5),
            Value::null(),
            Value::integer(3),
        ],
    );
    assert_eq!(
        program.result(&ctx(), &instance).unwrap(),
        Value::Float(6.5)
    );
}

#[test]
fn test_min_max_avg() {
    let values = [
        Value::integer(5),
        Value::null(),
        Value::integer(-2),
        Value::integer(9),
    ];

    let min = single_aggregate("min");
    let instance = accumulate_all(&min, &values);
    assert_eq!(min.result(&ctx(), &instance).unwrap(), Value::Integer(-2));

    let max = single_aggregate("max");
    let instance = accumulate_all(&max, &values);
    assert_eq!(max.result(&ctx(), &instance).unwrap(), Value::Integer(9));

    let avg = single_aggregate("avg");
    let instance = accumulate_all(&avg, &values);
    assert_eq!(avg.result(&ctx(), &instance).unwrap(), Value::Float(4.0));
}

#[test]
fn test_merge_associativity_over_all_splits() {
    // merge(accumulate(A), accumulate(B)) == accumulate(A ++ B) for every
    // split point, including the empty partitions at both ends
    let values: Vec<Value> = vec![
        Value::integer(3),
        Value::null(),
        Value::integer(1),
        Value::float(2.5),
        Value::integer(-7),
        Value::null(),
        Value::integer(10),
    ];

    for name in ["count", "sum", "min", "max", "avg"] {
        let program = single_aggregate(name);
        let whole = accumulate_all(&program, &values);
        let expected = program.result(&ctx(), &whole).unwrap();

        for split in 0..=values.len() {
            let (a, b) = values.split_at(split);
            let mut left = accumulate_all(&program, a);
            let right = accumulate_all(&program, b);
            program.merge(&mut left, &right).unwrap();

            assert_eq!(
                program.result(&ctx(), &left).unwrap(),
                expected,
                "{}: split at {} diverged",
                name,
                split
            );
        }
    }
}

#[test]
fn test_sum_merge_promotion_across_shards() {
    let program = single_aggregate("sum");
    let mut integer_shard = accumulate_all(&program, &[Value::integer(4)]);
    let float_shard = accumulate_all(&program, &[Value::float(1.5)]);

    program.merge(&mut integer_shard, &float_shard).unwrap();
    assert_eq!(
        program.result(&ctx(), &integer_shard).unwrap(),
        Value::Float(5.5)
    );
}

#[test]
fn test_reset_after_save_matches_fresh() {
    let values = [Value::integer(1), Value::float(2.5), Value::null()];

    for name in ["count", "sum", "min", "max", "avg"] {
        let program = single_aggregate(name);
        let fresh = program.new_instance();
        let fresh_result = program.result(&ctx(), &fresh).unwrap();

        let mut instance = accumulate_all(&program, &values);
        let mut buf = Vec::new();
        program.save_state(&instance, &mut buf).unwrap();

        program.reset(&mut instance);
        assert_eq!(
            program.result(&ctx(), &instance).unwrap(),
            fresh_result,
            "{}: reset after save did not reproduce a fresh instance",
            name
        );
    }
}

#[test]
fn test_save_load_roundtrip_multi_aggregate() {
    // add(sum(col0), mul(count(col0), min(col1))) exercises several slots in
    // one instance
    let mut b = ProgramBuilder::new();
    let col0 = b.input(0);
    let sum = b.aggregate("sum", vec![col0]).unwrap();
    let col0b = b.input(0);
    let count = b.aggregate("count", vec![col0b]).unwrap();
    let col1 = b.input(1);
    let min = b.aggregate("min", vec![col1]).unwrap();
    let product = b.call("mul", vec![count, min]).unwrap();
    let root = b.call("add", vec![sum, product]).unwrap();
    let program = b.build(root);
    assert_eq!(program.aggregate_slots(), 3);

    let ctx = ctx();
    let mut instance = program.new_instance();
    let rows = [
        [Value::integer(1), Value::integer(10)],
        [Value::integer(2), Value::integer(7)],
        [Value::integer(3), Value::integer(12)],
    ];
    for row in &rows {
        program.accumulate(&ctx, &mut instance, row).unwrap();
    }

    // sum=6, count=3, min=7 -> 6 + 3*7 = 27
    assert_eq!(
        program.result(&ctx, &instance).unwrap(),
        Value::Integer(27)
    );

    let mut buf = Vec::new();
    program.save_state(&instance, &mut buf).unwrap();

    let mut restored = program.new_instance();
    program
        .load_state(&mut restored, &mut buf.as_slice())
        .unwrap();
    assert_eq!(
        program.result(&ctx, &restored).unwrap(),
        Value::Integer(27)
    );
}

#[test]
fn test_mixed_select_list_folds_once_per_row() {
    // add(col0, sum(col1)): bare column and aggregate in one tree
    let mut b = ProgramBuilder::new();
    let col0 = b.input(0);
    let col1 = b.input(1);
    let sum = b.aggregate("sum", vec![col1]).unwrap();
    let root = b.call("add", vec![col0, sum]).unwrap();
    let program = b.build(root);

    let ctx = ctx();
    let mut instance = program.new_instance();
    let rows = [
        [Value::integer(100), Value::integer(1)],
        [Value::integer(200), Value::integer(2)],
    ];
    for row in &rows {
        program.accumulate(&ctx, &mut instance, row).unwrap();
    }

    // Projection happens later against a representative row
    let projected = program
        .evaluate(&ctx, Some(&instance), &rows[1])
        .unwrap();
    assert_eq!(projected, Value::Integer(203));
}

#[test]
fn test_reset_reuses_instance_across_groups() {
    let program = single_aggregate("sum");
    let ctx = ctx();
    let mut instance = program.new_instance();

    program
        .accumulate(&ctx, &mut instance, &[Value::integer(5)])
        .unwrap();
    assert_eq!(
        program.result(&ctx, &instance).unwrap(),
        Value::Integer(5)
    );

    program.reset(&mut instance);
    program
        .accumulate(&ctx, &mut instance, &[Value::float(1.5)])
        .unwrap();
    assert_eq!(
        program.result(&ctx, &instance).unwrap(),
        Value::Float(1.5)
    );
}

#[test]
fn test_result_is_repeatable() {
    let program = single_aggregate("count");
    let instance = accumulate_all(&program, &[Value::integer(1), Value::integer(2)]);

    let ctx = ctx();
    assert_eq!(program.result(&ctx, &instance).unwrap(), Value::Integer(2));
    assert_eq!(program.result(&ctx, &instance).unwrap(), Value::Integer(2));
}
