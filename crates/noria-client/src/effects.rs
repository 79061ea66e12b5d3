#![forbid(unsafe_code)]

use noria_dom::{Document, NodeHandle};

/// Work deferred until every message of a batch has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Move keyboard focus; the primitive may only be attached later in the
    /// same batch.
    Focus(NodeHandle),
}

#[derive(Debug, Default)]
pub struct EffectQueue {
    pending: Vec<Effect>,
}

impl EffectQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.pending.push(effect);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every pending effect in push order and return how many ran.
    ///
    /// A failing effect is logged and does not stop the rest.
    pub fn drain(&mut self, doc: &mut dyn Document) -> usize {
        let effects = std::mem::take(&mut self.pending);
        let count = effects.len();
        for effect in effects {
            let result = match effect {
                Effect::Focus(node) => doc.focus(node),
            };
            if let Err(err) = result {
                tracing::warn!(
                    target: "noria_client::component",
                    ?effect,
                    error = %err,
                    "deferred effect failed"
                );
            }
        }
        count
    }
}
