#![forbid(unsafe_code)]

//! Hidden input capture.
//!
//! An off-screen, zero-size `input` takes keyboard focus. Every `input`
//! event drains whatever was typed and forwards it to the `on-input` handler,
//! so nothing is ever echoed locally.

use std::cell::RefCell;
use std::rc::Rc;

use noria_dom::{Document, DomEvent, EventType, ListenerId, NodeHandle};
use serde_json::Value;
use smallvec::smallvec;
use tracing::warn;

use super::{ApplyCx, Component, Element};
use crate::error::ComponentError;
use crate::props::{Handler, PropValue, Props};

const VARIANT: &str = "input-capture";
const INPUT_KEY: &str = "on-input";

const HIDDEN_STYLE: &str =
    "position: absolute; left: -10000px; top: 0; width: 0; height: 0; border: 0; padding: 0; opacity: 0;";

#[derive(Debug)]
pub struct InputCapture {
    inner: Element,
    on_input: Rc<RefCell<Option<Handler>>>,
    listener: Option<ListenerId>,
}

impl InputCapture {
    pub fn create(cx: &mut ApplyCx<'_>, mut props: Props) -> Result<Self, ComponentError> {
        let mut inner = Element::create(cx, "input", Props::new())?;
        let node = inner.primitive();
        cx.doc.set_attribute(node, "style", HIDDEN_STYLE)?;
        cx.doc.set_attribute(node, "autocomplete", "off")?;

        let on_input = Rc::new(RefCell::new(None));
        if let Some(value) = props.remove(INPUT_KEY) {
            *on_input.borrow_mut() = input_handler(value)?;
        }
        let listener = cx.doc.add_listener(
            node,
            EventType::Input,
            capture_listener(node, Rc::clone(&on_input)),
        )?;
        inner.update_props(cx, props)?;
        Ok(Self {
            inner,
            on_input,
            listener: Some(listener),
        })
    }

    /// Whether typed text is currently forwarded anywhere.
    #[must_use]
    pub fn is_forwarding(&self) -> bool {
        self.on_input.borrow().is_some()
    }
}

fn input_handler(value: PropValue) -> Result<Option<Handler>, ComponentError> {
    match value {
        PropValue::Handler(handler) => Ok(Some(handler)),
        PropValue::RemoveHandler | PropValue::Unset => Ok(None),
        PropValue::Literal(_) => Err(ComponentError::invalid_prop(
            VARIANT,
            INPUT_KEY,
            "expected a handler",
        )),
    }
}

fn capture_listener(node: NodeHandle, on_input: Rc<RefCell<Option<Handler>>>) -> noria_dom::Listener {
    Rc::new(move |doc: &mut dyn Document, _: &DomEvent| {
        let captured = match doc.input_value(node) {
            Ok(value) => value,
            Err(err) => {
                warn!(target: "noria_client::component", error = %err, "could not read captured input");
                return;
            }
        };
        if let Err(err) = doc.set_input_value(node, "") {
            warn!(target: "noria_client::component", error = %err, "could not clear captured input");
        }
        let handler = on_input.borrow().clone();
        if let Some(handler) = handler {
            handler.fire(smallvec![Value::String(captured)]);
        }
    })
}

impl Component for InputCapture {
    fn variant(&self) -> &'static str {
        VARIANT
    }

    fn primitive(&self) -> NodeHandle {
        self.inner.primitive()
    }

    fn update_props(&mut self, cx: &mut ApplyCx<'_>, mut diff: Props) -> Result<(), ComponentError> {
        if let Some(value) = diff.remove(INPUT_KEY) {
            *self.on_input.borrow_mut() = input_handler(value)?;
        }
        self.inner.update_props(cx, diff)
    }

    fn add_child(&mut self, _: &mut ApplyCx<'_>, _: NodeHandle, _: usize) -> Result<(), ComponentError> {
        Err(ComponentError::unsupported(VARIANT, "add_child"))
    }

    fn remove_child(&mut self, _: &mut ApplyCx<'_>, _: NodeHandle) -> Result<(), ComponentError> {
        Err(ComponentError::unsupported(VARIANT, "remove_child"))
    }

    fn destroy(&mut self, cx: &mut ApplyCx<'_>) -> Result<(), ComponentError> {
        if let Some(listener) = self.listener.take() {
            cx.doc.remove_listener(self.inner.primitive(), listener)?;
        }
        self.on_input.borrow_mut().take();
        self.inner.destroy(cx)
    }
}
