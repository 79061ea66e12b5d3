#![forbid(unsafe_code)]

use noria_dom::NodeHandle;
use tracing::trace;

use super::{ApplyCx, Component};
use crate::error::ComponentError;
use crate::props::{PropValue, Props, literal_text};

const VARIANT: &str = "text";
const TEXT_KEY: &str = "text";

/// A single text primitive. Only the `text` key has any effect.
#[derive(Debug)]
pub struct TextLeaf {
    node: NodeHandle,
}

impl TextLeaf {
    pub fn create(cx: &mut ApplyCx<'_>, props: Props) -> Result<Self, ComponentError> {
        let node = cx.doc.create_text("");
        let mut leaf = Self { node };
        leaf.apply(cx, props)?;
        Ok(leaf)
    }

    fn apply(&mut self, cx: &mut ApplyCx<'_>, props: Props) -> Result<(), ComponentError> {
        for (key, value) in props {
            if key != TEXT_KEY {
                trace!(target: "noria_client::component", key = %key, "text leaf ignores key");
                continue;
            }
            let text = match value {
                PropValue::Literal(v) => literal_text(&v),
                PropValue::Unset => String::new(),
                PropValue::Handler(_) | PropValue::RemoveHandler => {
                    return Err(ComponentError::invalid_prop(VARIANT, key, "expected text"));
                }
            };
            cx.doc.set_text(self.node, &text)?;
        }
        Ok(())
    }
}

impl Component for TextLeaf {
    fn variant(&self) -> &'static str {
        VARIANT
    }

    fn primitive(&self) -> NodeHandle {
        self.node
    }

    fn update_props(&mut self, cx: &mut ApplyCx<'_>, diff: Props) -> Result<(), ComponentError> {
        self.apply(cx, diff)
    }

    fn add_child(&mut self, _: &mut ApplyCx<'_>, _: NodeHandle, _: usize) -> Result<(), ComponentError> {
        Err(ComponentError::unsupported(VARIANT, "add_child"))
    }

    fn remove_child(&mut self, _: &mut ApplyCx<'_>, _: NodeHandle) -> Result<(), ComponentError> {
        Err(ComponentError::unsupported(VARIANT, "remove_child"))
    }

    fn destroy(&mut self, _: &mut ApplyCx<'_>) -> Result<(), ComponentError> {
        Ok(())
    }
}
