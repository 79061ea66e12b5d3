#![forbid(unsafe_code)]

use core::fmt;
use std::collections::VecDeque;

use serde::Serialize;

use crate::protocol::{MessageKind, NodeId};

/// A message that was skipped or adjusted instead of applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// `make-node` named a type with no registered factory.
    UnknownType { node: NodeId, node_type: String },
    /// A message referred to a node that is not live. `role` says which
    /// field held the id (`node`, `parent` or `child`).
    DanglingReference {
        message: MessageKind,
        role: &'static str,
        node: NodeId,
    },
    /// `remove` for a node that is not attached under any parent.
    Detached { node: NodeId },
    /// `make-node` for an id that was still live; the old node was destroyed.
    Replaced { node: NodeId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { node, node_type } => {
                write!(f, "make-node {node}: unknown type {node_type:?}")
            }
            Self::DanglingReference {
                message,
                role,
                node,
            } => write!(f, "{message}: unknown {role} {node}"),
            Self::Detached { node } => write!(f, "remove {node}: node has no parent"),
            Self::Replaced { node } => write!(f, "make-node {node}: replaced a live node"),
        }
    }
}

/// Bounded in-memory diagnostic log. The oldest entries are dropped once
/// `capacity` is reached; `total` keeps counting.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
    total: u64,
}

impl Diagnostics {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.entries.len() >= self.capacity {
            let overflow = self.entries.len() - self.capacity + 1;
            self.entries.drain(..overflow);
        }
        self.entries.push_back(diagnostic);
        self.total += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics ever recorded, including dropped ones.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(256)
    }
}
