#![forbid(unsafe_code)]

//! The update interpreter.
//!
//! [`Reconciler::process`] applies a batch strictly in order. References to
//! ids or types it does not know are recorded as [`Diagnostic`]s and the
//! message is skipped; a [`ComponentError`] stops the batch. Deferred effects
//! run once at the end of every batch, whether or not it completed.

use noria_dom::{Document, NodeHandle};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::component::{ApplyCx, FactoryRegistry};
use crate::config::ClientConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::effects::EffectQueue;
use crate::error::{ComponentError, ReconcileError};
use crate::props::{Outbox, preprocess_props};
use crate::protocol::{MessageKind, NodeId, OutboundMessage, UpdateMessage, WireProps, decode_frame};
use crate::registry::{Entry, NodeRegistry};

/// What one call to [`Reconciler::process`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub applied: usize,
    pub skipped: usize,
    /// Deferred effects run at the end of the batch.
    pub effects: usize,
}

/// Owns the mirrored tree and everything needed to keep it in sync.
pub struct Reconciler<D: Document> {
    doc: D,
    config: ClientConfig,
    factories: FactoryRegistry,
    nodes: NodeRegistry,
    outbox: Outbox,
    effects: EffectQueue,
    diagnostics: Diagnostics,
}

impl<D: Document> Reconciler<D> {
    /// A reconciler with the default configuration and every built-in variant.
    pub fn new(doc: D) -> Self {
        Self::with_config(doc, ClientConfig::default())
    }

    /// `doc` must already carry the anchor named by `config.mount_anchor`;
    /// the reconciler only ever calls [`Document::mount`].
    pub fn with_config(doc: D, config: ClientConfig) -> Self {
        Self {
            doc,
            diagnostics: Diagnostics::new(config.diagnostics_capacity),
            config,
            factories: FactoryRegistry::with_defaults(),
            nodes: NodeRegistry::new(),
            outbox: Outbox::new(),
            effects: EffectQueue::new(),
        }
    }

    /// Replace the factory registry.
    #[must_use]
    pub fn with_factories(mut self, factories: FactoryRegistry) -> Self {
        self.factories = factories;
        self
    }

    pub fn doc(&self) -> &D {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn into_document(self) -> D {
        self.doc
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    pub fn factories_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.factories
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Queue of messages for the server. Handlers keep appending to it as
    /// events fire between batches.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Take every pending outbound message in firing order.
    pub fn take_outbound(&self) -> Vec<OutboundMessage> {
        self.outbox.drain()
    }

    /// The primitive of a live node.
    pub fn primitive_of(&self, id: NodeId) -> Option<NodeHandle> {
        self.nodes.get(id).map(|entry| entry.component.primitive())
    }

    /// Decode one inbound frame and apply it. A frame that fails to decode
    /// applies nothing.
    pub fn process_frame(&mut self, frame: &str) -> Result<BatchReport, ReconcileError> {
        let batch = decode_frame(frame)?;
        self.process(batch)
    }

    /// Apply `batch` in order, then run deferred effects.
    ///
    /// On a hard failure the messages before it stay applied, the rest are
    /// not attempted, and deferred effects still run.
    pub fn process(
        &mut self,
        batch: impl IntoIterator<Item = UpdateMessage>,
    ) -> Result<BatchReport, ReconcileError> {
        let mut report = BatchReport::default();
        let mut outcome = Ok(());
        for message in batch {
            match self.apply(message) {
                Ok(true) => report.applied += 1,
                Ok(false) => report.skipped += 1,
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        report.effects = self.effects.drain(&mut self.doc);
        debug!(
            target: "noria_client::reconcile",
            applied = report.applied,
            skipped = report.skipped,
            effects = report.effects,
            live = self.nodes.len(),
            failed = outcome.is_err(),
            "batch processed"
        );
        outcome.map(|()| report)
    }

    /// Apply one message. `Ok(false)` means it was skipped.
    fn apply(&mut self, message: UpdateMessage) -> Result<bool, ReconcileError> {
        let kind = message.kind();
        let node = message.node();
        let applied = match message {
            UpdateMessage::MakeNode {
                node,
                node_type,
                props,
            } => self.make_node(node, &node_type, props)?,
            UpdateMessage::UpdateProps { node, diff } => self.update_props(node, diff)?,
            UpdateMessage::Remove { node } => self.remove(node)?,
            UpdateMessage::Destroy { node } => self.destroy(node)?,
            UpdateMessage::Add {
                parent,
                child,
                index,
            } => self.add(parent, child, index)?,
        };
        if applied {
            trace!(target: "noria_client::reconcile", node = node.0, kind = kind.as_str(), "applied");
        }
        Ok(applied)
    }

    fn make_node(
        &mut self,
        id: NodeId,
        node_type: &str,
        props: WireProps,
    ) -> Result<bool, ReconcileError> {
        let Some(factory) = self.factories.get(node_type) else {
            self.report(Diagnostic::UnknownType {
                node: id,
                node_type: node_type.to_owned(),
            });
            return Ok(false);
        };

        if let Some(mut previous) = self.nodes.remove(id) {
            let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
            previous
                .component
                .destroy(&mut cx)
                .map_err(|err| ReconcileError::component(id, "make-node", err))?;
            // Nothing can address the old primitive once its entry is gone.
            let old = previous.component.primitive();
            if let Some(parent) = self
                .doc
                .parent_of(old)
                .map_err(|err| ReconcileError::component(id, "make-node", err.into()))?
            {
                self.doc
                    .remove_child(parent, old)
                    .map_err(|err| ReconcileError::component(id, "make-node", err.into()))?;
            }
            self.nodes.orphan_children(id);
            self.report(Diagnostic::Replaced { node: id });
        }

        let props = preprocess_props(id, props, &self.outbox);
        let component = {
            let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
            factory(&mut cx, props).map_err(|err| ReconcileError::component(id, "make-node", err))?
        };
        let primitive = component.primitive();
        self.nodes.insert(id, Entry::new(component));

        if id == self.config.root_node {
            self.doc
                .mount(primitive)
                .map_err(|err| ReconcileError::component(id, "make-node", ComponentError::from(err)))?;
            debug!(target: "noria_client::reconcile", node = id.0, "mounted root");
        }
        Ok(true)
    }

    fn update_props(&mut self, id: NodeId, diff: WireProps) -> Result<bool, ReconcileError> {
        if !self.nodes.contains(id) {
            self.dangling(MessageKind::UpdateProps, "node", id);
            return Ok(false);
        }
        let diff = preprocess_props(id, diff, &self.outbox);
        let Some(entry) = self.nodes.get_mut(id) else {
            return Ok(false);
        };
        let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
        entry
            .component
            .update_props(&mut cx, diff)
            .map_err(|err| ReconcileError::component(id, "update-props", err))?;
        Ok(true)
    }

    fn remove(&mut self, id: NodeId) -> Result<bool, ReconcileError> {
        let Some(entry) = self.nodes.get(id) else {
            self.dangling(MessageKind::Remove, "node", id);
            return Ok(false);
        };
        let child = entry.component.primitive();
        let Some(parent_id) = entry.parent else {
            self.report(Diagnostic::Detached { node: id });
            return Ok(false);
        };
        let Some(parent) = self.nodes.get_mut(parent_id) else {
            self.nodes.set_parent(id, None);
            self.dangling(MessageKind::Remove, "parent", parent_id);
            return Ok(false);
        };
        let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
        parent
            .component
            .remove_child(&mut cx, child)
            .map_err(|err| ReconcileError::component(parent_id, "remove", err))?;
        self.nodes.set_parent(id, None);
        Ok(true)
    }

    fn destroy(&mut self, id: NodeId) -> Result<bool, ReconcileError> {
        let Some(entry) = self.nodes.get_mut(id) else {
            self.dangling(MessageKind::Destroy, "node", id);
            return Ok(false);
        };
        let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
        entry
            .component
            .destroy(&mut cx)
            .map_err(|err| ReconcileError::component(id, "destroy", err))?;
        self.nodes.remove(id);
        self.nodes.orphan_children(id);
        Ok(true)
    }

    fn add(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<bool, ReconcileError> {
        let parent_live = self.nodes.contains(parent);
        let child_live = self.nodes.contains(child);
        if !parent_live {
            self.dangling(MessageKind::Add, "parent", parent);
        }
        if !child_live {
            self.dangling(MessageKind::Add, "child", child);
        }
        let (Some(child_primitive), Some(entry)) = (self.primitive_of(child), self.nodes.get_mut(parent))
        else {
            return Ok(false);
        };
        let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
        entry
            .component
            .add_child(&mut cx, child_primitive, index)
            .map_err(|err| ReconcileError::component(parent, "add", err))?;
        self.nodes.set_parent(child, Some(parent));
        Ok(true)
    }

    fn dangling(&mut self, message: MessageKind, role: &'static str, node: NodeId) {
        self.report(Diagnostic::DanglingReference {
            message,
            role,
            node,
        });
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(target: "noria_client::reconcile", "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

impl<D: Document + std::fmt::Debug> std::fmt::Debug for Reconciler<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("doc", &self.doc)
            .field("config", &self.config)
            .field("factories", &self.factories)
            .field("nodes", &self.nodes)
            .field("pending_outbound", &self.outbox.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
