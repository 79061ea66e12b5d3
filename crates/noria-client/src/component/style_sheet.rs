#![forbid(unsafe_code)]

use noria_dom::NodeHandle;
use serde_json::Value;

use super::{ApplyCx, Component};
use crate::error::ComponentError;
use crate::props::{PropValue, Props, literal_text};

const VARIANT: &str = "style";

/// One immutable CSS rule, `name { style }`.
#[derive(Debug)]
pub struct StyleSheet {
    node: NodeHandle,
    rule: String,
}

impl StyleSheet {
    pub fn create(cx: &mut ApplyCx<'_>, props: Props) -> Result<Self, ComponentError> {
        let rule = rule_text(&props)?;
        let node = cx.doc.create_element("style");
        cx.doc.set_text(node, &rule)?;
        Ok(Self { node, rule })
    }

    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }
}

/// Build the rule text from `name` and `style`.
///
/// `style` is either a declaration string used verbatim or an object whose
/// entries become `prop: value;` in key order.
pub fn rule_text(props: &Props) -> Result<String, ComponentError> {
    let name = match props.get("name") {
        Some(PropValue::Literal(Value::String(name))) if !name.is_empty() => name.as_str(),
        _ => {
            return Err(ComponentError::invalid_prop(
                VARIANT,
                "name",
                "expected a non-empty selector",
            ));
        }
    };
    let body = match props.get("style") {
        None | Some(PropValue::Unset) => String::new(),
        Some(PropValue::Literal(Value::String(style))) => style.clone(),
        Some(PropValue::Literal(Value::Object(declarations))) => {
            let mut declarations: Vec<_> = declarations.iter().collect();
            declarations.sort_by(|a, b| a.0.cmp(b.0));
            declarations
                .into_iter()
                .map(|(prop, value)| format!("{prop}: {};", literal_text(value)))
                .collect::<Vec<_>>()
                .join(" ")
        }
        Some(_) => {
            return Err(ComponentError::invalid_prop(
                VARIANT,
                "style",
                "expected a string or an object of declarations",
            ));
        }
    };
    Ok(format!("{name} {{ {body} }}"))
}

impl Component for StyleSheet {
    fn variant(&self) -> &'static str {
        VARIANT
    }

    fn primitive(&self) -> NodeHandle {
        self.node
    }

    fn update_props(&mut self, _: &mut ApplyCx<'_>, _: Props) -> Result<(), ComponentError> {
        Err(ComponentError::unsupported(VARIANT, "update_props"))
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
