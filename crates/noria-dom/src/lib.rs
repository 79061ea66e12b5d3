#![forbid(unsafe_code)]
#![doc = "Rendering-backend capability for noria-web."]
#![doc = ""]
#![doc = "This crate defines the boundary between the reconciler in `noria-client` and"]
#![doc = "whatever actually owns display primitives (a browser DOM through bindings, or"]
#![doc = "the in-memory [`HeadlessDocument`] used by tests and the replay tool)."]

pub mod headless;

use core::fmt;
use std::rc::Rc;

use thiserror::Error;

pub use headless::HeadlessDocument;

/// Opaque handle to one display primitive owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u32);

impl NodeHandle {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registration token returned by [`Document::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

impl ListenerId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Native event names the reconciler listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Focus,
    Blur,
    Wheel,
    MouseDown,
    MouseUp,
    Input,
}

impl EventType {
    /// DOM event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Wheel => "wheel",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::Input => "input",
        }
    }

    /// Whether the event propagates from the target to its ancestors.
    #[must_use]
    pub const fn bubbles(self) -> bool {
        !matches!(self, Self::Focus | Self::Blur)
    }
}

/// A native event as delivered to listeners.
///
/// Pointer coordinates are client-space; wheel deltas are in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub kind: EventType,
    /// Filled in by the document when the event is dispatched.
    pub target: Option<NodeHandle>,
    pub client_x: f64,
    pub client_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
}

impl DomEvent {
    #[must_use]
    pub const fn new(kind: EventType) -> Self {
        Self {
            kind,
            target: None,
            client_x: 0.0,
            client_y: 0.0,
            delta_x: 0.0,
            delta_y: 0.0,
        }
    }

    #[must_use]
    pub const fn click() -> Self {
        Self::new(EventType::Click)
    }

    #[must_use]
    pub const fn input() -> Self {
        Self::new(EventType::Input)
    }

    #[must_use]
    pub const fn wheel(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            ..Self::new(EventType::Wheel)
        }
    }

    #[must_use]
    pub const fn mouse_down(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            ..Self::new(EventType::MouseDown)
        }
    }

    #[must_use]
    pub const fn mouse_up(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            ..Self::new(EventType::MouseUp)
        }
    }
}

/// Callback registered on a primitive.
///
/// Listeners receive the document so they can read or mutate primitive state
/// (the hidden input clears its own value from inside its listener).
pub type Listener = Rc<dyn Fn(&mut dyn Document, &DomEvent)>;

/// Backend failures. Any of these means the caller handed the document a
/// handle or relation it does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeHandle),

    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        parent: NodeHandle,
        child: NodeHandle,
    },

    #[error("node {0} is not an element")]
    NotAnElement(NodeHandle),

    #[error("node {0} is not a text node")]
    NotAText(NodeHandle),

    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle {
        parent: NodeHandle,
        child: NodeHandle,
    },

    #[error("{listener} is not registered on node {node}")]
    UnknownListener {
        node: NodeHandle,
        listener: ListenerId,
    },
}

/// Primitive operations the reconciler needs from a rendering backend.
///
/// Insert operations move a node that already has a parent, as the DOM does.
pub trait Document {
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeHandle;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> NodeHandle;

    fn set_attribute(&mut self, node: NodeHandle, name: &str, value: &str)
    -> Result<(), DomError>;

    fn remove_attribute(&mut self, node: NodeHandle, name: &str) -> Result<(), DomError>;

    fn attribute(&self, node: NodeHandle, name: &str) -> Result<Option<String>, DomError>;

    /// Replace the text content of a node wholesale.
    ///
    /// On an element this drops every child, like `textContent = ...`.
    fn set_text(&mut self, node: NodeHandle, text: &str) -> Result<(), DomError>;

    /// Concatenated text content of a node and its descendants.
    fn text(&self, node: NodeHandle) -> Result<String, DomError>;

    fn child_count(&self, parent: NodeHandle) -> Result<usize, DomError>;

    fn child_at(&self, parent: NodeHandle, index: usize) -> Result<Option<NodeHandle>, DomError>;

    fn parent_of(&self, node: NodeHandle) -> Result<Option<NodeHandle>, DomError>;

    fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), DomError>;

    /// Insert `child` immediately before `reference`, which must be a child of `parent`.
    fn insert_before(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        reference: NodeHandle,
    ) -> Result<(), DomError>;

    fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), DomError>;

    /// Swap `old` for `new` in one operation.
    fn replace_child(
        &mut self,
        parent: NodeHandle,
        new: NodeHandle,
        old: NodeHandle,
    ) -> Result<(), DomError>;

    /// Attach a node under the document's mount anchor.
    fn mount(&mut self, node: NodeHandle) -> Result<(), DomError>;

    fn add_listener(
        &mut self,
        node: NodeHandle,
        kind: EventType,
        listener: Listener,
    ) -> Result<ListenerId, DomError>;

    fn remove_listener(&mut self, node: NodeHandle, listener: ListenerId) -> Result<(), DomError>;

    /// Move keyboard focus to `node`. Detached nodes cannot take focus; the
    /// request is ignored for them.
    fn focus(&mut self, node: NodeHandle) -> Result<(), DomError>;

    fn focused(&self) -> Option<NodeHandle>;

    fn input_value(&self, node: NodeHandle) -> Result<String, DomError>;

    fn set_input_value(&mut self, node: NodeHandle, value: &str) -> Result<(), DomError>;

    /// Client-space origin of the nearest positioned ancestor of `node`
    /// (the node itself included), or `(0.0, 0.0)` when there is none.
    fn positioned_origin(&self, node: NodeHandle) -> Result<(f64, f64), DomError>;
}

/// Insert `child` at `index` in `parent`'s display order, appending when the
/// index is at or past the current child count.
pub fn insert_child_at(
    doc: &mut dyn Document,
    parent: NodeHandle,
    child: NodeHandle,
    index: usize,
) -> Result<(), DomError> {
    if index >= doc.child_count(parent)? {
        return doc.append_child(parent, child);
    }
    match doc.child_at(parent, index)? {
        Some(reference) if reference == child => Ok(()),
        Some(reference) => doc.insert_before(parent, child, reference),
        None => doc.append_child(parent, child),
    }
}
