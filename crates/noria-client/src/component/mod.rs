#![forbid(unsafe_code)]

//! The component contract and the factory registry.
//!
//! A component owns exactly one top-level primitive in the [`Document`] and
//! mirrors one server node. The reconciler only ever talks to components
//! through [`Component`]; each variant lives in its own module.

pub mod element;
pub mod input_capture;
pub mod raw_line;
pub mod style_sheet;
pub mod text;

use std::rc::Rc;

use noria_dom::{Document, NodeHandle};
use rustc_hash::FxHashMap;

use crate::effects::EffectQueue;
use crate::error::ComponentError;
use crate::props::Props;

pub use element::Element;
pub use input_capture::InputCapture;
pub use raw_line::RawLine;
pub use style_sheet::StyleSheet;
pub use text::TextLeaf;

/// Everything a component may touch while applying a message.
pub struct ApplyCx<'a> {
    pub doc: &'a mut dyn Document,
    pub effects: &'a mut EffectQueue,
}

impl<'a> ApplyCx<'a> {
    pub fn new(doc: &'a mut dyn Document, effects: &'a mut EffectQueue) -> Self {
        Self { doc, effects }
    }
}

pub trait Component {
    /// Variant name used in errors and logs.
    fn variant(&self) -> &'static str;

    fn primitive(&self) -> NodeHandle;

    /// Apply a sparse property patch.
    fn update_props(&mut self, cx: &mut ApplyCx<'_>, diff: Props) -> Result<(), ComponentError>;

    /// Attach `child` before the child currently at `index`, or append.
    fn add_child(
        &mut self,
        cx: &mut ApplyCx<'_>,
        child: NodeHandle,
        index: usize,
    ) -> Result<(), ComponentError>;

    fn remove_child(&mut self, cx: &mut ApplyCx<'_>, child: NodeHandle)
    -> Result<(), ComponentError>;

    /// Release listeners and other resources. Does not detach the primitive.
    fn destroy(&mut self, cx: &mut ApplyCx<'_>) -> Result<(), ComponentError>;
}

/// Constructor for one node type, given the preprocessed initial props.
pub type Factory =
    Rc<dyn Fn(&mut ApplyCx<'_>, Props) -> Result<Box<dyn Component>, ComponentError>>;

/// Node type name to constructor.
#[derive(Default, Clone)]
pub struct FactoryRegistry {
    factories: FxHashMap<String, Factory>,
}

impl FactoryRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in variant:
    ///
    /// | type | variant |
    /// |---|---|
    /// | `div`, `span`, `pre` | [`Element`] |
    /// | `text` | [`TextLeaf`] |
    /// | `style` | [`StyleSheet`] |
    /// | `input-capture` | [`InputCapture`] |
    /// | `raw-line` | [`RawLine`] |
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for tag in ["div", "span", "pre"] {
            registry.register(tag, move |cx, props| {
                Ok(Box::new(Element::create(cx, tag, props)?) as Box<dyn Component>)
            });
        }
        registry.register("text", |cx, props| {
            Ok(Box::new(TextLeaf::create(cx, props)?) as Box<dyn Component>)
        });
        registry.register("style", |cx, props| {
            Ok(Box::new(StyleSheet::create(cx, props)?) as Box<dyn Component>)
        });
        registry.register("input-capture", |cx, props| {
            Ok(Box::new(InputCapture::create(cx, props)?) as Box<dyn Component>)
        });
        registry.register("raw-line", |cx, props| {
            Ok(Box::new(RawLine::create(cx, props)?) as Box<dyn Component>)
        });
        registry
    }

    /// Register or replace the constructor for `node_type`.
    pub fn register<F>(&mut self, node_type: impl Into<String>, factory: F)
    where
        F: Fn(&mut ApplyCx<'_>, Props) -> Result<Box<dyn Component>, ComponentError> + 'static,
    {
        self.factories.insert(node_type.into(), Rc::new(factory));
    }

    #[must_use]
    pub fn get(&self, node_type: &str) -> Option<Factory> {
        self.factories.get(node_type).cloned()
    }

    #[must_use]
    pub fn contains(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("types", &self.types())
            .finish()
    }
}
