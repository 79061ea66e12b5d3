#![forbid(unsafe_code)]

//! Host-driven, in-memory [`Document`].
//!
//! `HeadlessDocument` keeps a plain node arena with DOM-like insertion rules.
//! Nothing happens on its own: the host pushes events through
//! [`HeadlessDocument::dispatch`] and reads the tree back with
//! [`HeadlessDocument::to_html`]. This makes reconciler behaviour fully
//! deterministic under test and in transcript replay.
//!
//! Handles are arena indices and are never reused, so detached nodes stay
//! allocated for the life of the document: memory grows with the number of
//! primitives ever created, not with the size of the mounted tree. That is
//! fine for tests and bounded transcripts; a long-lived host should use a
//! backend that frees detached nodes.

use core::fmt;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::trace;

use crate::{Document, DomError, DomEvent, EventType, Listener, ListenerId, NodeHandle};

/// Default id attribute of the mount anchor.
pub const DEFAULT_ANCHOR_ID: &str = "root";

struct Registration {
    id: ListenerId,
    kind: EventType,
    listener: Listener,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        value: String,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    listeners: Vec<Registration>,
    origin: (f64, f64),
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            origin: (0.0, 0.0),
        }
    }

    fn is_positioned(&self) -> bool {
        let NodeKind::Element { attributes, .. } = &self.kind else {
            return false;
        };
        let Some(style) = attributes.get("style") else {
            return false;
        };
        style.split(';').any(|decl| {
            let Some((name, value)) = decl.split_once(':') else {
                return false;
            };
            name.trim().eq_ignore_ascii_case("position")
                && !value.trim().eq_ignore_ascii_case("static")
        })
    }
}

/// In-memory document with a single mount anchor.
///
/// Detached nodes are kept, see the module docs.
#[derive(Debug)]
pub struct HeadlessDocument {
    nodes: Vec<NodeData>,
    anchor: NodeHandle,
    focused: Option<NodeHandle>,
    next_listener: u32,
}

impl HeadlessDocument {
    /// Create a document whose anchor is `<div id="root">`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_anchor(DEFAULT_ANCHOR_ID)
    }

    /// Create a document whose anchor element carries `id="{anchor_id}"`.
    #[must_use]
    pub fn with_anchor(anchor_id: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("id".to_owned(), anchor_id.to_owned());
        let anchor = NodeData::new(NodeKind::Element {
            tag: "div".to_owned(),
            attributes,
            value: String::new(),
        });
        Self {
            nodes: vec![anchor],
            anchor: NodeHandle::new(0),
            focused: None,
            next_listener: 0,
        }
    }

    /// The mount anchor element.
    #[must_use]
    pub const fn anchor(&self) -> NodeHandle {
        self.anchor
    }

    /// Number of primitives ever created, anchor included. Detached nodes
    /// still count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` is reachable from the anchor.
    #[must_use]
    pub fn is_connected(&self, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == self.anchor {
                return true;
            }
            current = self.node(handle).ok().and_then(|data| data.parent);
        }
        false
    }

    /// Number of listeners currently registered directly on `node`.
    pub fn listener_count(&self, node: NodeHandle) -> Result<usize, DomError> {
        Ok(self.node(node)?.listeners.len())
    }

    /// Tag name of an element.
    pub fn tag(&self, node: NodeHandle) -> Result<&str, DomError> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag, .. } => Ok(tag),
            NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }

    /// Assign the client-space origin reported for `node` when it is the
    /// nearest positioned ancestor of a pointer target.
    pub fn set_origin(&mut self, node: NodeHandle, x: f64, y: f64) -> Result<(), DomError> {
        self.node_mut(node)?.origin = (x, y);
        Ok(())
    }

    /// Deliver `event` to `target`, bubbling to ancestors when the event type
    /// bubbles. Returns the number of listeners invoked.
    ///
    /// Listeners run in registration order per node, target first. The set of
    /// listeners is fixed when dispatch starts.
    pub fn dispatch(&mut self, target: NodeHandle, mut event: DomEvent) -> Result<usize, DomError> {
        self.node(target)?;
        event.target = Some(target);

        let mut path = vec![target];
        if event.kind.bubbles() {
            let mut current = self.node(target)?.parent;
            while let Some(handle) = current {
                path.push(handle);
                current = self.node(handle)?.parent;
            }
        }

        let mut listeners = Vec::new();
        for handle in &path {
            let data = self.node(*handle)?;
            listeners.extend(
                data.listeners
                    .iter()
                    .filter(|registration| registration.kind == event.kind)
                    .map(|registration| Rc::clone(&registration.listener)),
            );
        }

        trace!(
            target: "noria_dom::dispatch",
            node = target.get(),
            event = event.kind.as_str(),
            listeners = listeners.len(),
            "dispatching event"
        );

        for listener in &listeners {
            listener(&mut *self, &event);
        }
        Ok(listeners.len())
    }

    /// Append `text` to an input's value and fire `input`, as typing would.
    pub fn type_text(&mut self, node: NodeHandle, text: &str) -> Result<usize, DomError> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Element { value, .. } => value.push_str(text),
            NodeKind::Text(_) => return Err(DomError::NotAnElement(node)),
        }
        self.dispatch(node, DomEvent::input())
    }

    /// Serialize `node` and its subtree. Attributes are emitted in name order.
    pub fn to_html(&self, node: NodeHandle) -> Result<String, DomError> {
        let mut out = String::new();
        self.write_html(node, &mut out)?;
        Ok(out)
    }

    /// Serialize everything mounted under the anchor.
    #[must_use]
    pub fn mounted_html(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[self.anchor.get() as usize].children {
            // Children of the anchor are always live arena entries.
            let _ = self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeHandle, out: &mut String) -> Result<(), DomError> {
        let data = self.node(node)?;
        match &data.kind {
            NodeKind::Text(text) => escape_into(text, out),
            NodeKind::Element {
                tag, attributes, ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                for child in &data.children {
                    self.write_html(*child, out)?;
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
        Ok(())
    }

    fn node(&self, handle: NodeHandle) -> Result<&NodeData, DomError> {
        self.nodes
            .get(handle.get() as usize)
            .ok_or(DomError::UnknownNode(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut NodeData, DomError> {
        self.nodes
            .get_mut(handle.get() as usize)
            .ok_or(DomError::UnknownNode(handle))
    }

    fn push(&mut self, kind: NodeKind) -> NodeHandle {
        let handle = NodeHandle::new(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind));
        handle
    }

    fn attributes_mut(
        &mut self,
        node: NodeHandle,
    ) -> Result<&mut BTreeMap<String, String>, DomError> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }

    /// Validate that `child` may be placed under `parent`, then unlink it
    /// from wherever it currently lives.
    fn prepare_insert(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), DomError> {
        if matches!(self.node(parent)?.kind, NodeKind::Text(_)) {
            return Err(DomError::NotAnElement(parent));
        }
        self.node(child)?;
        let mut current = Some(parent);
        while let Some(handle) = current {
            if handle == child {
                return Err(DomError::Cycle { parent, child });
            }
            current = self.node(handle)?.parent;
        }
        self.detach(child)
    }

    fn detach(&mut self, child: NodeHandle) -> Result<(), DomError> {
        if let Some(old_parent) = self.node_mut(child)?.parent.take() {
            self.node_mut(old_parent)?
                .children
                .retain(|existing| *existing != child);
        }
        Ok(())
    }

    fn position_of(&self, parent: NodeHandle, child: NodeHandle) -> Result<usize, DomError> {
        self.node(parent)?
            .children
            .iter()
            .position(|existing| *existing == child)
            .ok_or(DomError::NotAChild { parent, child })
    }

    fn collect_text(&self, node: NodeHandle, out: &mut String) -> Result<(), DomError> {
        let data = self.node(node)?;
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &data.children {
                    self.collect_text(*child, out)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for HeadlessDocument {
    fn create_element(&mut self, tag: &str) -> NodeHandle {
        self.push(NodeKind::Element {
            tag: tag.to_owned(),
            attributes: BTreeMap::new(),
            value: String::new(),
        })
    }

    fn create_text(&mut self, text: &str) -> NodeHandle {
        self.push(NodeKind::Text(text.to_owned()))
    }

    fn set_attribute(
        &mut self,
        node: NodeHandle,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        self.attributes_mut(node)?
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeHandle, name: &str) -> Result<(), DomError> {
        self.attributes_mut(node)?.remove(name);
        Ok(())
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Result<Option<String>, DomError> {
        match &self.node(node)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes.get(name).cloned()),
            NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }

    fn set_text(&mut self, node: NodeHandle, text: &str) -> Result<(), DomError> {
        if let NodeKind::Text(existing) = &mut self.node_mut(node)?.kind {
            text.clone_into(existing);
            return Ok(());
        }
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node)?;
        }
        Ok(())
    }

    fn text(&self, node: NodeHandle) -> Result<String, DomError> {
        let mut out = String::new();
        self.collect_text(node, &mut out)?;
        Ok(out)
    }

    fn child_count(&self, parent: NodeHandle) -> Result<usize, DomError> {
        Ok(self.node(parent)?.children.len())
    }

    fn child_at(&self, parent: NodeHandle, index: usize) -> Result<Option<NodeHandle>, DomError> {
        Ok(self.node(parent)?.children.get(index).copied())
    }

    fn parent_of(&self, node: NodeHandle) -> Result<Option<NodeHandle>, DomError> {
        Ok(self.node(node)?.parent)
    }

    fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), DomError> {
        self.prepare_insert(parent, child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        reference: NodeHandle,
    ) -> Result<(), DomError> {
        self.position_of(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.prepare_insert(parent, child)?;
        let index = self.position_of(parent, reference)?;
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), DomError> {
        let index = self.position_of(parent, child)?;
        self.node_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: NodeHandle,
        new: NodeHandle,
        old: NodeHandle,
    ) -> Result<(), DomError> {
        self.position_of(parent, old)?;
        if new == old {
            return Ok(());
        }
        self.prepare_insert(parent, new)?;
        let index = self.position_of(parent, old)?;
        self.node_mut(parent)?.children[index] = new;
        self.node_mut(new)?.parent = Some(parent);
        self.node_mut(old)?.parent = None;
        Ok(())
    }

    fn mount(&mut self, node: NodeHandle) -> Result<(), DomError> {
        let anchor = self.anchor;
        self.append_child(anchor, node)
    }

    fn add_listener(
        &mut self,
        node: NodeHandle,
        kind: EventType,
        listener: Listener,
    ) -> Result<ListenerId, DomError> {
        self.node(node)?;
        let id = ListenerId::new(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        self.node_mut(node)?.listeners.push(Registration { id, kind, listener });
        Ok(id)
    }

    fn remove_listener(&mut self, node: NodeHandle, listener: ListenerId) -> Result<(), DomError> {
        let listeners = &mut self.node_mut(node)?.listeners;
        let before = listeners.len();
        listeners.retain(|registration| registration.id != listener);
        if listeners.len() == before {
            return Err(DomError::UnknownListener { node, listener });
        }
        Ok(())
    }

    fn focus(&mut self, node: NodeHandle) -> Result<(), DomError> {
        if matches!(self.node(node)?.kind, NodeKind::Text(_)) {
            return Err(DomError::NotAnElement(node));
        }
        if !self.is_connected(node) {
            trace!(
                target: "noria_dom::dispatch",
                node = node.get(),
                "ignoring focus request for detached node"
            );
            return Ok(());
        }
        if self.focused == Some(node) {
            return Ok(());
        }
        if let Some(previous) = self.focused.replace(node) {
            self.dispatch(previous, DomEvent::new(EventType::Blur))?;
        }
        self.dispatch(node, DomEvent::new(EventType::Focus))?;
        Ok(())
    }

    fn focused(&self) -> Option<NodeHandle> {
        self.focused
    }

    fn input_value(&self, node: NodeHandle) -> Result<String, DomError> {
        match &self.node(node)?.kind {
            NodeKind::Element { value, .. } => Ok(value.clone()),
            NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }

    fn set_input_value(&mut self, node: NodeHandle, new_value: &str) -> Result<(), DomError> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Element { value, .. } => {
                new_value.clone_into(value);
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }

    fn positioned_origin(&self, node: NodeHandle) -> Result<(f64, f64), DomError> {
        let mut current = Some(node);
        while let Some(handle) = current {
            let data = self.node(handle)?;
            if data.is_positioned() {
                return Ok(data.origin);
            }
            current = data.parent;
        }
        Ok((0.0, 0.0))
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}
