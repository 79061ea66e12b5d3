#![forbid(unsafe_code)]

//! Raw styled line.
//!
//! The primitive is an outer `div` holding one content wrapper. Each update
//! lays the whole line out again and swaps the wrapper in a single
//! `replace_child`; spans are never patched in place.

use noria_dom::{Document, DomError, NodeHandle};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use super::{ApplyCx, Component};
use crate::error::ComponentError;
use crate::props::{PropValue, Props, literal_text};
use crate::segments::{LineLayout, Metrics, Run, render_segments};

const VARIANT: &str = "raw-line";

pub const METRICS_KEY: &str = "metrics";
pub const TEXT_KEY: &str = "text";
pub const FG_KEY: &str = "fg-markup";
pub const BG_KEY: &str = "bg-markup";

/// The last full property set of a line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineState {
    pub metrics: Metrics,
    pub text: String,
    pub fg: Vec<Run>,
    pub bg: Vec<Run>,
}

impl LineState {
    /// Overlay a sparse patch. Absent keys keep their value, `Unset` resets
    /// a key to its default.
    pub fn overlay(&mut self, diff: Props) -> Result<(), ComponentError> {
        for (key, value) in diff {
            let value = match value {
                PropValue::Literal(value) => Some(value),
                PropValue::Unset => None,
                PropValue::Handler(_) | PropValue::RemoveHandler => {
                    return Err(ComponentError::invalid_prop(
                        VARIANT,
                        key,
                        "handlers are not accepted",
                    ));
                }
            };
            match key.as_str() {
                METRICS_KEY => self.metrics = decode(&key, value)?,
                TEXT_KEY => self.text = value.as_ref().map(literal_text).unwrap_or_default(),
                FG_KEY => self.fg = decode(&key, value)?,
                BG_KEY => self.bg = decode(&key, value)?,
                _ => trace!(target: "noria_client::component", key = %key, "raw line ignores key"),
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn layout(&self) -> LineLayout {
        render_segments(&self.text, &self.fg, &self.bg, self.metrics)
    }
}

fn decode<T: DeserializeOwned + Default>(key: &str, value: Option<Value>) -> Result<T, ComponentError> {
    match value {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|err| ComponentError::invalid_prop(VARIANT, key, err.to_string())),
    }
}

#[derive(Debug)]
pub struct RawLine {
    node: NodeHandle,
    content: NodeHandle,
    state: LineState,
}

impl RawLine {
    pub fn create(cx: &mut ApplyCx<'_>, props: Props) -> Result<Self, ComponentError> {
        let mut state = LineState::default();
        state.overlay(props)?;
        let node = cx.doc.create_element("div");
        cx.doc.set_attribute(node, "class", "raw-line")?;
        let content = build_content(cx.doc, &state.layout(), state.metrics)?;
        cx.doc.append_child(node, content)?;
        Ok(Self {
            node,
            content,
            state,
        })
    }

    #[must_use]
    pub fn state(&self) -> &LineState {
        &self.state
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

/// Build a detached content wrapper: background layer first, foreground on top.
fn build_content(
    doc: &mut dyn Document,
    layout: &LineLayout,
    metrics: Metrics,
) -> Result<NodeHandle, DomError> {
    let wrapper = doc.create_element("div");
    doc.set_attribute(
        wrapper,
        "style",
        &format!("position: relative; height: {};", px(metrics.height)),
    )?;

    let background = doc.create_element("div");
    doc.set_attribute(background, "class", "raw-line-bg")?;
    doc.set_attribute(background, "style", "position: absolute; left: 0; top: 0;")?;
    for band in &layout.bands {
        let el = doc.create_element("div");
        doc.set_attribute(el, "class", &band.class)?;
        doc.set_attribute(
            el,
            "style",
            &format!(
                "position: absolute; top: 0; left: {}; width: {}; height: {};",
                px(band.left),
                px(band.width),
                px(band.height)
            ),
        )?;
        doc.append_child(background, el)?;
    }
    doc.append_child(wrapper, background)?;

    let foreground = doc.create_element("div");
    doc.set_attribute(foreground, "class", "raw-line-fg")?;
    doc.set_attribute(foreground, "style", "position: relative; white-space: pre;")?;
    for segment in &layout.segments {
        let span = doc.create_element("span");
        if let Some(class) = &segment.class {
            doc.set_attribute(span, "class", class)?;
        }
        let text = doc.create_text(&segment.text);
        doc.append_child(span, text)?;
        doc.append_child(foreground, span)?;
    }
    doc.append_child(wrapper, foreground)?;
    Ok(wrapper)
}

impl Component for RawLine {
    fn variant(&self) -> &'static str {
        VARIANT
    }

    fn primitive(&self) -> NodeHandle {
        self.node
    }

    fn update_props(&mut self, cx: &mut ApplyCx<'_>, diff: Props) -> Result<(), ComponentError> {
        let mut next = self.state.clone();
        next.overlay(diff)?;
        let content = build_content(cx.doc, &next.layout(), next.metrics)?;
        cx.doc.replace_child(self.node, content, self.content)?;
        self.content = content;
        self.state = next;
        Ok(())
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
