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

//! Compiled expression programs
//!
//! A `Program` is the compiled form of an expression: an arena of nodes with
//! index-based child links, plus metadata computed once at build time. Nodes
//! own their constants and compiled patterns, so the whole program is
//! immutable, self-contained, and shareable across threads after
//! construction. Per-evaluation state lives in a separate
//! [`Instance`](super::Instance), sized here by the number of aggregate
//! slots.

use std::sync::Arc;

use regex::Regex;

use crate::core::{Error, Result, Value};
use crate::executor::pattern::CompiledPattern;
use crate::functions::{global_registry, AggregateFunction, ScalarFunction};

/// Index of a node within its program's arena
pub type NodeId = usize;

/// One node of a compiled expression tree
pub(crate) enum Node {
    /// A program-owned constant
    Literal(Value),

    /// Reference to a column of the input row
    Input(usize),

    /// Short-circuit conditional; exactly one branch is evaluated
    Conditional {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },

    /// Stateless native function call
    PureCall {
        function: Arc<dyn ScalarFunction>,
        args: Vec<NodeId>,
    },

    /// Stateful aggregate call; state lives at `slot` in the instance
    AggregateCall {
        prototype: Box<dyn AggregateFunction>,
        slot: usize,
        args: Vec<NodeId>,
    },

    /// Regex match of the subject's text form
    RegexMatch { pattern: Regex, subject: NodeId },

    /// SQL LIKE match of the subject's text form
    LikeMatch {
        pattern: CompiledPattern,
        subject: NodeId,
    },
}

/// Builder for compiled expression programs
///
/// The planner appends nodes bottom-up, then seals the tree with
/// [`ProgramBuilder::build`]. Patterns are compiled at append time so an
/// invalid pattern fails the build, not the first row.
#[derive(Default)]
pub struct ProgramBuilder {
    nodes: Vec<Node>,
}

impl ProgramBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Add a constant node
    pub fn literal(&mut self, value: impl Into<Value>) -> NodeId {
        self.push(Node::Literal(value.into()))
    }

    /// Add an input-row reference node
    pub fn input(&mut self, index: usize) -> NodeId {
        self.push(Node::Input(index))
    }

    /// Add a short-circuit conditional node
    pub fn conditional(
        &mut self,
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    ) -> NodeId {
        self.push(Node::Conditional {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// Add a pure call node for a caller-supplied function
    pub fn pure_call(&mut self, function: Arc<dyn ScalarFunction>, args: Vec<NodeId>) -> NodeId {
        self.push(Node::PureCall { function, args })
    }

    /// Add a pure call node, resolving the function by name
    pub fn call(&mut self, name: &str, args: Vec<NodeId>) -> Result<NodeId> {
        let function = global_registry()
            .get_scalar(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        Ok(self.pure_call(function, args))
    }

    /// Add an aggregate call node for a caller-supplied prototype
    ///
    /// The slot is assigned at build time.
    pub fn aggregate_call(
        &mut self,
        prototype: Box<dyn AggregateFunction>,
        args: Vec<NodeId>,
    ) -> NodeId {
        self.push(Node::AggregateCall {
            prototype,
            slot: 0,
            args,
        })
    }

    /// Add an aggregate call node, resolving the function by name
    pub fn aggregate(&mut self, name: &str, args: Vec<NodeId>) -> Result<NodeId> {
        let prototype = global_registry()
            .get_aggregate(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        Ok(self.aggregate_call(prototype, args))
    }

    /// Add a regex match node, compiling the pattern
    pub fn regex_match(&mut self, pattern: &str, subject: NodeId) -> Result<NodeId> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(self.push(Node::RegexMatch { pattern, subject }))
    }

    /// Add a LIKE match node, compiling the pattern
    pub fn like_match(&mut self, pattern: &str, subject: NodeId) -> Result<NodeId> {
        let pattern = CompiledPattern::compile(pattern)?;
        Ok(self.push(Node::LikeMatch { pattern, subject }))
    }

    /// Seal the tree rooted at `root` into an immutable program
    ///
    /// Assigns every aggregate call a unique state slot and computes the
    /// aggregate metadata in a single pass.
    pub fn build(mut self, root: NodeId) -> Program {
        debug_assert!(root < self.nodes.len(), "root node out of range");

        let mut slots = 0;
        for node in &mut self.nodes {
            if let Node::AggregateCall { slot, .. } = node {
                *slot = slots;
                slots += 1;
            }
        }

        Program {
            nodes: self.nodes,
            root,
            aggregate_slots: slots,
        }
    }
}

/// Compiled expression program
///
/// Immutable and read-only after construction; a program (including its
/// owned constants and patterns) may be shared across threads without
/// synchronization. All mutable evaluation state lives in caller-owned
/// [`Instance`](super::Instance)s.
pub struct Program {
    /// Node arena; child links are indices into this vector
    pub(crate) nodes: Vec<Node>,

    /// Root of the expression tree
    root: NodeId,

    /// Number of aggregate state slots an instance of this program carries
    aggregate_slots: usize,
}

impl Program {
    /// Root node of the expression tree
    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    /// True iff the tree contains at least one aggregate call
    pub fn has_aggregate(&self) -> bool {
        self.aggregate_slots > 0
    }

    /// Number of aggregate state slots instances of this program carry
    pub fn aggregate_slots(&self) -> usize {
        self.aggregate_slots
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}
