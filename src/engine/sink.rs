use crate::engine::effects::UiEffect;

/// Receiver for UI effects.
///
/// Takes `&self`: the sink is shared by every component on the page and
/// effects may be emitted while a run is suspended on the network.
pub trait EffectSink {
    fn emit(&self, effect: UiEffect);
}
