#![forbid(unsafe_code)]

//! Generic element: attributes, interaction handlers and focus requests.

use std::collections::BTreeMap;
use std::rc::Rc;

use noria_dom::{Document, DomEvent, EventType, ListenerId, NodeHandle, insert_child_at};
use serde_json::{Value, json};
use smallvec::smallvec;
use tracing::trace;

use super::{ApplyCx, Component};
use crate::effects::Effect;
use crate::error::ComponentError;
use crate::props::{Handler, HandlerArgs, PropValue, Props, literal_text};

const VARIANT: &str = "element";

/// Property key that requests keyboard focus when `true`.
pub const FOCUS_KEY: &str = "focused?";

type Adapter = fn(&dyn Document, NodeHandle, &DomEvent) -> HandlerArgs;

/// A property key bound to a native event and the arguments it forwards.
#[derive(Clone, Copy)]
pub struct Interaction {
    pub key: &'static str,
    pub event: EventType,
    adapt: Adapter,
}

/// Every interaction key a generic element understands.
pub const INTERACTIONS: &[Interaction] = &[
    Interaction {
        key: "on-click",
        event: EventType::Click,
        adapt: no_args,
    },
    Interaction {
        key: "on-focus",
        event: EventType::Focus,
        adapt: no_args,
    },
    Interaction {
        key: "on-blur",
        event: EventType::Blur,
        adapt: no_args,
    },
    Interaction {
        key: "on-wheel",
        event: EventType::Wheel,
        adapt: wheel_delta,
    },
    Interaction {
        key: "on-mouse-down",
        event: EventType::MouseDown,
        adapt: relative_pointer,
    },
    Interaction {
        key: "on-mouse-up",
        event: EventType::MouseUp,
        adapt: relative_pointer,
    },
];

#[must_use]
pub fn interaction(key: &str) -> Option<&'static Interaction> {
    INTERACTIONS.iter().find(|i| i.key == key)
}

fn no_args(_: &dyn Document, _: NodeHandle, _: &DomEvent) -> HandlerArgs {
    HandlerArgs::new()
}

fn wheel_delta(_: &dyn Document, _: NodeHandle, event: &DomEvent) -> HandlerArgs {
    smallvec![json!(event.delta_x), json!(event.delta_y)]
}

fn relative_pointer(doc: &dyn Document, node: NodeHandle, event: &DomEvent) -> HandlerArgs {
    let target = event.target.unwrap_or(node);
    let (x, y) = doc.positioned_origin(target).unwrap_or((0.0, 0.0));
    smallvec![json!(event.client_x - x), json!(event.client_y - y)]
}

/// Generic element (`div`, `span`, `pre`, and the inner `input` of the
/// capture variant).
#[derive(Debug)]
pub struct Element {
    node: NodeHandle,
    tag: &'static str,
    listeners: BTreeMap<&'static str, ListenerId>,
}

impl Element {
    pub fn create(cx: &mut ApplyCx<'_>, tag: &'static str, props: Props) -> Result<Self, ComponentError> {
        let node = cx.doc.create_element(tag);
        let mut element = Self {
            node,
            tag,
            listeners: BTreeMap::new(),
        };
        element.apply(cx, props)?;
        Ok(element)
    }

    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Keys with a live listener, in key order.
    pub fn installed(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.listeners.keys().copied()
    }

    fn apply(&mut self, cx: &mut ApplyCx<'_>, props: Props) -> Result<(), ComponentError> {
        for (key, value) in props {
            if let Some(interaction) = interaction(&key) {
                self.apply_interaction(cx.doc, interaction, value)?;
            } else if key == FOCUS_KEY {
                match value {
                    PropValue::Literal(Value::Bool(true)) => {
                        cx.effects.push(Effect::Focus(self.node));
                    }
                    PropValue::Literal(Value::Bool(false)) | PropValue::Unset => {}
                    _ => {
                        return Err(ComponentError::invalid_prop(
                            VARIANT,
                            key,
                            "expected a boolean",
                        ));
                    }
                }
            } else {
                match value {
                    PropValue::Literal(v) => cx.doc.set_attribute(self.node, &key, &literal_text(&v))?,
                    PropValue::Unset => cx.doc.remove_attribute(self.node, &key)?,
                    PropValue::Handler(_) | PropValue::RemoveHandler => {
                        return Err(ComponentError::invalid_prop(
                            VARIANT,
                            key,
                            "handlers are only accepted on interaction keys",
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_interaction(
        &mut self,
        doc: &mut dyn Document,
        interaction: &'static Interaction,
        value: PropValue,
    ) -> Result<(), ComponentError> {
        match value {
            PropValue::Handler(handler) => {
                self.uninstall(doc, interaction.key)?;
                let id = doc.add_listener(
                    self.node,
                    interaction.event,
                    forwarding_listener(self.node, interaction.adapt, handler),
                )?;
                self.listeners.insert(interaction.key, id);
                trace!(
                    target: "noria_client::component",
                    node = self.node.get(),
                    key = interaction.key,
                    "installed handler"
                );
            }
            PropValue::RemoveHandler | PropValue::Unset => self.uninstall(doc, interaction.key)?,
            PropValue::Literal(_) => {
                return Err(ComponentError::invalid_prop(
                    VARIANT,
                    interaction.key,
                    "expected a handler",
                ));
            }
        }
        Ok(())
    }

    fn uninstall(&mut self, doc: &mut dyn Document, key: &'static str) -> Result<(), ComponentError> {
        if let Some(id) = self.listeners.remove(key) {
            doc.remove_listener(self.node, id)?;
            trace!(
                target: "noria_client::component",
                node = self.node.get(),
                key,
                "removed handler"
            );
        }
        Ok(())
    }
}

fn forwarding_listener(
    node: NodeHandle,
    adapt: Adapter,
    handler: Handler,
) -> noria_dom::Listener {
    Rc::new(move |doc: &mut dyn Document, event: &DomEvent| {
        handler.fire(adapt(&*doc, node, event));
    })
}

impl Component for Element {
    fn variant(&self) -> &'static str {
        VARIANT
    }

    fn primitive(&self) -> NodeHandle {
        self.node
    }

    fn update_props(&mut self, cx: &mut ApplyCx<'_>, diff: Props) -> Result<(), ComponentError> {
        self.apply(cx, diff)
    }

    fn add_child(
        &mut self,
        cx: &mut ApplyCx<'_>,
        child: NodeHandle,
        index: usize,
    ) -> Result<(), ComponentError> {
        insert_child_at(cx.doc, self.node, child, index)?;
        Ok(())
    }

    fn remove_child(
        &mut self,
        cx: &mut ApplyCx<'_>,
        child: NodeHandle,
    ) -> Result<(), ComponentError> {
        cx.doc.remove_child(self.node, child)?;
        Ok(())
    }

    fn destroy(&mut self, cx: &mut ApplyCx<'_>) -> Result<(), ComponentError> {
        for (_, id) in std::mem::take(&mut self.listeners) {
            cx.doc.remove_listener(self.node, id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectQueue;
    use crate::props::{Outbox, preprocess_props};
    use crate::protocol::{NodeId, OutboundMessage, WireProps, WireValue};
    use noria_dom::HeadlessDocument;
    use pretty_assertions::assert_eq;

    fn wire(pairs: &[(&str, WireValue)]) -> WireProps {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    struct Fixture {
        doc: HeadlessDocument,
        effects: EffectQueue,
        outbox: Outbox,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                doc: HeadlessDocument::new(),
                effects: EffectQueue::new(),
                outbox: Outbox::new(),
            }
        }

        fn props(&self, pairs: &[(&str, WireValue)]) -> Props {
            preprocess_props(NodeId(1), wire(pairs), &self.outbox)
        }

        fn create(&mut self, pairs: &[(&str, WireValue)]) -> Element {
            let props = self.props(pairs);
            let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
            Element::create(&mut cx, "div", props).unwrap()
        }

        fn update(&mut self, element: &mut Element, pairs: &[(&str, WireValue)]) -> Result<(), ComponentError> {
            let props = self.props(pairs);
            let mut cx = ApplyCx::new(&mut self.doc, &mut self.effects);
            element.update_props(&mut cx, props)
        }
    }

    #[test]
    fn literals_become_attributes() {
        let mut fx = Fixture::new();
        let el = fx.create(&[
            ("class", WireValue::Literal(json!("row"))),
            ("tabindex", WireValue::Literal(json!(0))),
        ]);
        assert_eq!(
            fx.doc.to_html(el.primitive()).unwrap(),
            r#"<div class="row" tabindex="0"></div>"#
        );
    }

    #[test]
    fn null_removes_attribute() {
        let mut fx = Fixture::new();
        let mut el = fx.create(&[("title", WireValue::Literal(json!("t")))]);
        fx.update(&mut el, &[("title", WireValue::Null)]).unwrap();
        assert_eq!(fx.doc.attribute(el.primitive(), "title").unwrap(), None);
    }

    #[test]
    fn click_sends_without_arguments() {
        let mut fx = Fixture::new();
        let el = fx.create(&[("on-click", WireValue::InstallHandler)]);
        fx.doc.dispatch(el.primitive(), DomEvent::click()).unwrap();
        assert_eq!(
            fx.outbox.drain(),
            vec![OutboundMessage {
                node: NodeId(1),
                key: "on-click".to_owned(),
                arguments: vec![],
            }]
        );
    }

    #[test]
    fn wheel_forwards_deltas() {
        let mut fx = Fixture::new();
        let el = fx.create(&[("on-wheel", WireValue::InstallHandler)]);
        fx.doc
            .dispatch(el.primitive(), DomEvent::wheel(1.5, -40.0))
            .unwrap();
        let sent = fx.outbox.drain();
        assert_eq!(sent[0].arguments, vec![json!(1.5), json!(-40.0)]);
    }

    #[test]
    fn mouse_down_is_relative_to_positioned_ancestor() {
        let mut fx = Fixture::new();
        let el = fx.create(&[
            ("style", WireValue::Literal(json!("position: relative"))),
            ("on-mouse-down", WireValue::InstallHandler),
        ]);
        fx.doc.set_origin(el.primitive(), 100.0, 50.0).unwrap();
        let inner = fx.doc.create_element("span");
        fx.doc.append_child(el.primitive(), inner).unwrap();
        fx.doc
            .dispatch(inner, DomEvent::mouse_down(130.0, 58.0))
            .unwrap();
        let sent = fx.outbox.drain();
        assert_eq!(sent[0].key, "on-mouse-down");
        assert_eq!(sent[0].arguments, vec![json!(30.0), json!(8.0)]);
    }

    #[test]
    fn reinstall_replaces_listener() {
        let mut fx = Fixture::new();
        let mut el = fx.create(&[("on-click", WireValue::InstallHandler)]);
        fx.update(&mut el, &[("on-click", WireValue::InstallHandler)])
            .unwrap();
        assert_eq!(fx.doc.listener_count(el.primitive()).unwrap(), 1);
        fx.doc.dispatch(el.primitive(), DomEvent::click()).unwrap();
        assert_eq!(fx.outbox.len(), 1);
    }

    #[test]
    fn remove_sentinel_uninstalls() {
        let mut fx = Fixture::new();
        let mut el = fx.create(&[("on-click", WireValue::InstallHandler)]);
        fx.update(&mut el, &[("on-click", WireValue::RemoveHandler)])
            .unwrap();
        fx.doc.dispatch(el.primitive(), DomEvent::click()).unwrap();
        assert!(fx.outbox.is_empty());
        assert_eq!(el.installed().count(), 0);
    }

    #[test]
    fn focus_request_is_deferred() {
        let mut fx = Fixture::new();
        let el = fx.create(&[(FOCUS_KEY, WireValue::Literal(json!(true)))]);
        assert_eq!(fx.effects.len(), 1);
        assert_eq!(fx.doc.focused(), None);
        fx.doc.mount(el.primitive()).unwrap();
        fx.effects.drain(&mut fx.doc);
        assert_eq!(fx.doc.focused(), Some(el.primitive()));
        assert_eq!(fx.doc.attribute(el.primitive(), FOCUS_KEY).unwrap(), None);
    }

    #[test]
    fn literal_on_interaction_key_is_rejected() {
        let mut fx = Fixture::new();
        let mut el = fx.create(&[]);
        let err = fx
            .update(&mut el, &[("on-click", WireValue::Literal(json!("go")))])
            .unwrap_err();
        assert!(matches!(err, ComponentError::InvalidProp { .. }));
    }

    #[test]
    fn destroy_unregisters_every_listener() {
        let mut fx = Fixture::new();
        let mut el = fx.create(&[
            ("on-click", WireValue::InstallHandler),
            ("on-wheel", WireValue::InstallHandler),
        ]);
        let mut cx = ApplyCx::new(&mut fx.doc, &mut fx.effects);
        el.destroy(&mut cx).unwrap();
        assert_eq!(fx.doc.listener_count(el.primitive()).unwrap(), 0);
    }

    #[test]
    fn children_insert_by_index() {
        let mut fx = Fixture::new();
        let mut el = fx.create(&[]);
        let a = fx.doc.create_text("a");
        let b = fx.doc.create_text("b");
        let c = fx.doc.create_text("c");
        let mut cx = ApplyCx::new(&mut fx.doc, &mut fx.effects);
        el.add_child(&mut cx, a, 0).unwrap();
        el.add_child(&mut cx, c, 5).unwrap();
        el.add_child(&mut cx, b, 1).unwrap();
        el.remove_child(&mut cx, a).unwrap();
        assert_eq!(fx.doc.to_html(el.primitive()).unwrap(), "<div>bc</div>");
    }
}
