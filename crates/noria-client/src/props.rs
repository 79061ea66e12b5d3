#![forbid(unsafe_code)]

//! Property preprocessing.
//!
//! Turns a [`WireProps`] patch into a [`Props`] patch in which every
//! install sentinel has been replaced by a live [`Handler`] that sends an
//! [`OutboundMessage`] tagged with the owning node and key.

use core::fmt;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;
use smallvec::SmallVec;

use crate::protocol::{NodeId, OutboundMessage, WireProps, WireValue};

/// Arguments a handler forwards to the server. Interaction adapters produce
/// at most two values, so they stay inline.
pub type HandlerArgs = SmallVec<[Value; 2]>;

/// Installed callable for one (node, key) pair.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(HandlerArgs)>);

impl Handler {
    pub fn new(f: impl Fn(HandlerArgs) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn fire(&self, args: HandlerArgs) {
        (self.0)(args);
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A property value after preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Literal(Value),
    /// The key was explicitly cleared (`null` on the wire).
    Unset,
    Handler(Handler),
    RemoveHandler,
}

impl PropValue {
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Literal(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// Sparse property patch; absent keys are untouched.
pub type Props = BTreeMap<String, PropValue>;

/// Append-only FIFO of messages bound for the server.
///
/// Clones share the same queue; handlers hold one clone each.
#[derive(Debug, Clone, Default)]
pub struct Outbox(Rc<RefCell<VecDeque<OutboundMessage>>>);

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, message: OutboundMessage) {
        self.0.borrow_mut().push_back(message);
    }

    /// Take every pending message in send order.
    pub fn drain(&self) -> Vec<OutboundMessage> {
        self.0.borrow_mut().drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Bind a wire patch to `node`, creating one sending handler per install
/// sentinel. Non-sentinel values pass through unchanged.
#[must_use]
pub fn preprocess_props(node: NodeId, props: WireProps, outbox: &Outbox) -> Props {
    props
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                WireValue::Literal(v) => PropValue::Literal(v),
                WireValue::Null => PropValue::Unset,
                WireValue::RemoveHandler => PropValue::RemoveHandler,
                WireValue::InstallHandler => {
                    PropValue::Handler(sending_handler(node, key.clone(), outbox.clone()))
                }
            };
            (key, value)
        })
        .collect()
}

fn sending_handler(node: NodeId, key: String, outbox: Outbox) -> Handler {
    Handler::new(move |args| {
        outbox.send(OutboundMessage {
            node,
            key: key.clone(),
            arguments: args.into_vec(),
        });
    })
}

/// Render a literal as attribute or text content: strings verbatim, anything
/// else as its JSON text.
#[must_use]
pub fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
