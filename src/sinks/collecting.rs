use std::cell::RefCell;

use crate::engine::effects::UiEffect;
use crate::engine::sink::EffectSink;

/// An in-memory sink that records every effect in emission order.
///
/// Used by tests and by hosts that apply effects in batches.
#[derive(Debug, Default)]
pub struct CollectingSink {
    effects: RefCell<Vec<UiEffect>>,
}

impl CollectingSink {
    /// Create a new, empty collecting sink.
    pub fn new() -> Self {
        Self {
            effects: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot of all collected effects.
    pub fn effects(&self) -> Vec<UiEffect> {
        self.effects.borrow().clone()
    }

    /// Remove and return the collected effects.
    pub fn drain(&self) -> Vec<UiEffect> {
        std::mem::take(&mut *self.effects.borrow_mut())
    }

    /// Consume the sink and return the collected effects.
    pub fn into_effects(self) -> Vec<UiEffect> {
        self.effects.into_inner()
    }
}

impl EffectSink for CollectingSink {
    fn emit(&self, effect: UiEffect) {
        self.effects.borrow_mut().push(effect);
    }
}
