#![forbid(unsafe_code)]

use noria_dom::DomError;
use thiserror::Error;

use crate::protocol::NodeId;

/// A component was asked to do something it structurally cannot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComponentError {
    #[error("{variant} does not support {operation}")]
    Unsupported {
        variant: &'static str,
        operation: &'static str,
    },

    #[error("{variant}: invalid value for `{key}`: {reason}")]
    InvalidProp {
        variant: &'static str,
        key: String,
        reason: String,
    },

    #[error("backend error: {0}")]
    Dom(#[from] DomError),
}

impl ComponentError {
    #[must_use]
    pub const fn unsupported(variant: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { variant, operation }
    }

    #[must_use]
    pub fn invalid_prop(
        variant: &'static str,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidProp {
            variant,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures that stop a batch. Lookup misses are never reported this way.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("could not decode frame: {0}")]
    Decode(#[from] ProtocolError),

    #[error("{message} on node {node} failed: {source}")]
    Component {
        node: NodeId,
        message: &'static str,
        #[source]
        source: ComponentError,
    },
}

impl ReconcileError {
    #[must_use]
    pub const fn component(node: NodeId, message: &'static str, source: ComponentError) -> Self {
        Self::Component {
            node,
            message,
            source,
        }
    }

    /// The node whose component failed, if any.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Decode(_) => None,
            Self::Component { node, .. } => Some(*node),
        }
    }
}
