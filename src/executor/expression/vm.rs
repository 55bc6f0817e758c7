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

//! The tree-walking evaluator
//!
//! Stateless recursive evaluation of a [`Program`] against a caller-owned
//! [`Instance`] and a row of input values. Two entry modes exist:
//!
//! - `evaluate` produces a [`Value`]; aggregate calls resolve to their
//!   current state and never fold the row.
//! - `accumulate` folds one row into the instance's aggregate state without
//!   producing a value; non-aggregate nodes only recurse. A SELECT list
//!   mixing bare columns and aggregates therefore folds once per row, and
//!   the projected value is produced later by a plain `evaluate`.
//!
//! Failures propagate synchronously; a failed call leaves the instance
//! mutated exactly as far as completed sub-evaluations reached.

use std::io::{Read, Write};

use smallvec::SmallVec;

use crate::core::{Error, Result, Value};
use crate::executor::ExecutionContext;
use crate::functions::AggregateFunction;

use super::program::{Node, NodeId, Program};

/// Transient per-call argument buffer; most natives take one or two args
type ArgBuffer = SmallVec<[Value; 4]>;

/// Mutable evaluation state for one program
///
/// One instance per output group (or one shared instance for non-grouped
/// scans, or one per shard for partial aggregation). A scalar program's
/// instance is a single embedded value; an aggregate program's instance is
/// one state box per aggregate slot. Instances of distinct programs are not
/// interchangeable.
pub struct Instance {
    state: InstanceState,
}

enum InstanceState {
    /// Embedded result value of a program without aggregates
    Scalar(Value),

    /// Aggregate state boxes, indexed by the program's slot assignment
    Aggregate(Vec<Box<dyn AggregateFunction>>),
}

impl Instance {
    fn slot(&self, slot: usize) -> Option<&dyn AggregateFunction> {
        match &self.state {
            InstanceState::Aggregate(states) => states.get(slot).map(|s| s.as_ref()),
            InstanceState::Scalar(_) => None,
        }
    }
}

impl Program {
    /// Allocate and initialize an instance for this program
    pub fn new_instance(&self) -> Instance {
        if !self.has_aggregate() {
            return Instance {
                state: InstanceState::Scalar(Value::Null),
            };
        }

        // Arena order equals slot order, both assigned in build()
        let mut states = Vec::with_capacity(self.aggregate_slots());
        for node in &self.nodes {
            if let Node::AggregateCall { prototype, .. } = node {
                states.push(prototype.clone_box());
            }
        }

        Instance {
            state: InstanceState::Aggregate(states),
        }
    }

    /// Evaluate the expression tree to a value
    ///
    /// `instance` may be None for programs without aggregate calls; an
    /// aggregate call evaluated without an instance fails with
    /// [`Error::InstanceRequired`]. Aggregate calls read their current state
    /// and never fold the row.
    pub fn evaluate(
        &self,
        ctx: &ExecutionContext,
        instance: Option<&Instance>,
        row: &[Value],
    ) -> Result<Value> {
        self.evaluate_node(ctx, instance, self.root(), row)
    }

    /// Fold one input row into the instance
    ///
    /// Aggregate path: evaluates each aggregate call's arguments and invokes
    /// its accumulate hook. Scalar path: evaluates the whole tree into the
    /// embedded value.
    pub fn accumulate(
        &self,
        ctx: &ExecutionContext,
        instance: &mut Instance,
        row: &[Value],
    ) -> Result<()> {
        if self.has_aggregate() {
            return self.accumulate_node(ctx, instance, self.root(), row);
        }

        let value = self.evaluate_node(ctx, None, self.root(), row)?;
        instance.state = InstanceState::Scalar(value);
        Ok(())
    }

    /// Materialize the instance's current result
    ///
    /// Aggregate path: evaluates the tree root, transitively resolving every
    /// aggregate call through its get hook. Scalar path: copies the embedded
    /// value. Repeatable; does not disturb the state.
    pub fn result(&self, ctx: &ExecutionContext, instance: &Instance) -> Result<Value> {
        match &instance.state {
            InstanceState::Aggregate(_) => {
                self.evaluate_node(ctx, Some(instance), self.root(), &[])
            }
            InstanceState::Scalar(value) => Ok(value.clone()),
        }
    }

    /// Fold `src`'s partial-aggregation state into `dst`
    ///
    /// Both instances must belong to this program. Used to combine
    /// shard-local aggregates into a global result.
    pub fn merge(&self, dst: &mut Instance, src: &Instance) -> Result<()> {
        match (&mut dst.state, &src.state) {
            (InstanceState::Aggregate(dst_states), InstanceState::Aggregate(src_states)) => {
                for (dst_state, src_state) in dst_states.iter_mut().zip(src_states.iter()) {
                    dst_state.merge(src_state.as_ref())?;
                }
                Ok(())
            }
            (InstanceState::Scalar(dst_value), InstanceState::Scalar(src_value)) => {
                *dst_value = src_value.clone();
                Ok(())
            }
            _ => Err(Error::invalid_argument(
                "can't merge instances of different programs",
            )),
        }
    }

    /// Return the instance to its freshly initialized state without
    /// reallocating
    pub fn reset(&self, instance: &mut Instance) {
        match &mut instance.state {
            InstanceState::Aggregate(states) => {
                for state in states {
                    state.reset();
                }
            }
            InstanceState::Scalar(value) => *value = Value::Null,
        }
    }

    /// Checkpoint the instance's state to a byte stream
    pub fn save_state(&self, instance: &Instance, out: &mut dyn Write) -> Result<()> {
        match &instance.state {
            InstanceState::Aggregate(states) => {
                for state in states {
                    state.save_state(out)?;
                }
                Ok(())
            }
            InstanceState::Scalar(value) => value.encode(out),
        }
    }

    /// Restore the instance's state from a byte stream
    pub fn load_state(&self, instance: &mut Instance, input: &mut dyn Read) -> Result<()> {
        match &mut instance.state {
            InstanceState::Aggregate(states) => {
                for state in states {
                    state.load_state(input)?;
                }
                Ok(())
            }
            InstanceState::Scalar(value) => {
                *value = Value::decode(input)?;
                Ok(())
            }
        }
    }

    fn evaluate_node(
        &self,
        ctx: &ExecutionContext,
        instance: Option<&Instance>,
        node: NodeId,
        row: &[Value],
    ) -> Result<Value> {
        match self.node(node) {
            Node::Literal(value) => Ok(value.clone()),

            Node::Input(index) => row.get(*index).cloned().ok_or(Error::RowIndexOutOfRange {
                index: *index,
                argc: row.len(),
            }),

            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.evaluate_node(ctx, instance, *condition, row)?;
                let branch = if cond.to_boolean()? {
                    *then_branch
                } else {
                    *else_branch
                };
                self.evaluate_node(ctx, instance, branch, row)
            }

            Node::PureCall { function, args } => {
                let mut argv = ArgBuffer::with_capacity(args.len());
                for &child in args {
                    argv.push(self.evaluate_node(ctx, instance, child, row)?);
                }
                function.evaluate(ctx, &argv)
            }

            Node::AggregateCall { slot, .. } => {
                let state = instance
                    .and_then(|i| i.slot(*slot))
                    .ok_or(Error::InstanceRequired)?;
                Ok(state.result())
            }

            Node::RegexMatch { pattern, subject } => {
                let subject = self.evaluate_node(ctx, instance, *subject, row)?;
                Ok(Value::Boolean(pattern.is_match(&subject.to_text())))
            }

            Node::LikeMatch { pattern, subject } => {
                let subject = self.evaluate_node(ctx, instance, *subject, row)?;
                Ok(Value::Boolean(pattern.matches(&subject.to_text())))
            }
        }
    }

    fn accumulate_node(
        &self,
        ctx: &ExecutionContext,
        instance: &mut Instance,
        node: NodeId,
        row: &[Value],
    ) -> Result<()> {
        match self.node(node) {
            Node::AggregateCall { slot, args, .. } => {
                let mut argv = ArgBuffer::with_capacity(args.len());
                for &child in args {
                    argv.push(self.evaluate_node(ctx, Some(&*instance), child, row)?);
                }

                match &mut instance.state {
                    InstanceState::Aggregate(states) => states[*slot].accumulate(ctx, &argv),
                    InstanceState::Scalar(_) => Err(Error::InstanceRequired),
                }
            }

            Node::Literal(_) | Node::Input(_) => Ok(()),

            // Both branches fold; short-circuiting applies to evaluation only
            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.accumulate_node(ctx, instance, *condition, row)?;
                self.accumulate_node(ctx, instance, *then_branch, row)?;
                self.accumulate_node(ctx, instance, *else_branch, row)
            }

            Node::PureCall { args, .. } => {
                for &child in args {
                    self.accumulate_node(ctx, instance, child, row)?;
                }
                Ok(())
            }

            Node::RegexMatch { subject, .. } | Node::LikeMatch { subject, .. } => {
                self.accumulate_node(ctx, instance, *subject, row)
            }
        }
    }
}
