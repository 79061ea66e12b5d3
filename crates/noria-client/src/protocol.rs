#![forbid(unsafe_code)]

//! Wire schema for the inbound update stream and outbound handler messages.
//!
//! One inbound frame is a JSON array of messages discriminated by
//! `update_type`; every field name is prefixed with the message kind:
//!
//! ```json
//! [
//!   {"update_type": "make-node", "make-node_node": 0, "make-node_type": "div",
//!    "make-node_props": {"class": "editor", "on-click": "noria-handler"}},
//!   {"update_type": "add", "add_parent": 0, "add_child": 4, "add_index": 0}
//! ]
//! ```
//!
//! Handler sentinels are decoded here into [`WireValue`] variants so that no
//! later stage ever compares attribute strings against them.

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Property value meaning "install a live handler for this key".
pub const HANDLER_SENTINEL: &str = "noria-handler";
/// Property value meaning "uninstall the handler for this key".
pub const REMOVE_HANDLER_SENTINEL: &str = "-noria-handler";

/// Server-assigned node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Default root id, attached to the mount anchor on creation.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A property value as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum WireValue {
    Literal(Value),
    Null,
    InstallHandler,
    RemoveHandler,
}

impl From<Value> for WireValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) if s == HANDLER_SENTINEL => Self::InstallHandler,
            Value::String(s) if s == REMOVE_HANDLER_SENTINEL => Self::RemoveHandler,
            other => Self::Literal(other),
        }
    }
}

/// Sparse property patch as decoded from the wire.
pub type WireProps = BTreeMap<String, WireValue>;

/// One instruction from the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "update_type")]
pub enum UpdateMessage {
    #[serde(rename = "make-node")]
    MakeNode {
        #[serde(rename = "make-node_node")]
        node: NodeId,
        #[serde(rename = "make-node_type")]
        node_type: String,
        #[serde(rename = "make-node_props", default)]
        props: WireProps,
    },
    #[serde(rename = "update-props")]
    UpdateProps {
        #[serde(rename = "update-props_node")]
        node: NodeId,
        #[serde(rename = "update-props_props-diff", default)]
        diff: WireProps,
    },
    #[serde(rename = "remove")]
    Remove {
        #[serde(rename = "remove_node")]
        node: NodeId,
    },
    #[serde(rename = "destroy")]
    Destroy {
        #[serde(rename = "destroy_node")]
        node: NodeId,
    },
    #[serde(rename = "add")]
    Add {
        #[serde(rename = "add_parent")]
        parent: NodeId,
        #[serde(rename = "add_child")]
        child: NodeId,
        #[serde(rename = "add_index")]
        index: usize,
    },
}

impl UpdateMessage {
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::MakeNode { .. } => MessageKind::MakeNode,
            Self::UpdateProps { .. } => MessageKind::UpdateProps,
            Self::Remove { .. } => MessageKind::Remove,
            Self::Destroy { .. } => MessageKind::Destroy,
            Self::Add { .. } => MessageKind::Add,
        }
    }

    /// The node the message is about (the child, for `add`).
    #[must_use]
    pub const fn node(&self) -> NodeId {
        match self {
            Self::MakeNode { node, .. }
            | Self::UpdateProps { node, .. }
            | Self::Remove { node }
            | Self::Destroy { node } => *node,
            Self::Add { child, .. } => *child,
        }
    }
}

/// Discriminant of an [`UpdateMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    MakeNode,
    UpdateProps,
    Remove,
    Destroy,
    Add,
}

impl MessageKind {
    pub const ALL: [Self; 5] = [
        Self::MakeNode,
        Self::UpdateProps,
        Self::Remove,
        Self::Destroy,
        Self::Add,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MakeNode => "make-node",
            Self::UpdateProps => "update-props",
            Self::Remove => "remove",
            Self::Destroy => "destroy",
            Self::Add => "add",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode one inbound frame.
pub fn decode_frame(frame: &str) -> Result<Vec<UpdateMessage>, ProtocolError> {
    Ok(serde_json::from_str(frame)?)
}

/// Message sent to the server whenever an installed handler fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub node: NodeId,
    pub key: String,
    pub arguments: Vec<Value>,
}

impl OutboundMessage {
    /// Encode as the single JSON object sent per event.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::json!({
            "node": self.node,
            "key": self.key,
            "arguments": self.arguments,
        })
        .to_string()
    }
}
