#![forbid(unsafe_code)]

//! `noria-client` keeps a local mirror of a server-computed UI tree.
//!
//! The server streams frames of [`UpdateMessage`]s; a [`Reconciler`] applies
//! each frame in order to the components in its [`NodeRegistry`], which in turn
//! drive primitives through a [`noria_dom::Document`]. The client never diffs
//! or lays out anything itself.
//!
//! Design goals:
//! - **One owner**: factories, nodes, outbox and effect queue all live in a
//!   [`Reconciler`]; there is no global state.
//! - **Resilient stream handling**: references to unknown nodes or types are
//!   reported as [`Diagnostic`]s and skipped, never fatal.
//! - **Loud contract violations**: a component asked to do something it
//!   structurally cannot returns a [`ComponentError`] that aborts the batch.
//! - **Deterministic deferral**: work that must wait until a batch is applied
//!   (focus) goes through the [`EffectQueue`].

pub mod component;
pub mod config;
pub mod diagnostics;
pub mod effects;
pub mod error;
pub mod props;
pub mod protocol;
pub mod reconcile;
pub mod registry;
pub mod segments;

pub use component::{ApplyCx, Component, Factory, FactoryRegistry};
pub use config::{ClientConfig, ConfigError};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use effects::{Effect, EffectQueue};
pub use error::{ComponentError, ProtocolError, ReconcileError};
pub use props::{Handler, HandlerArgs, Outbox, PropValue, Props, preprocess_props};
pub use protocol::{
    MessageKind, NodeId, OutboundMessage, UpdateMessage, WireProps, WireValue, decode_frame,
};
pub use reconcile::{BatchReport, Reconciler};
pub use registry::{Entry, NodeRegistry};
