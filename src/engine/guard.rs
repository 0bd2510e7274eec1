use std::cell::Cell;

use crate::engine::effects::{RunControl, UiEffect};
use crate::engine::sink::EffectSink;
use crate::engine::RunState;

/// Holds the run state at `Submitting` for as long as it lives.
///
/// Dropping the guard is the run's finalizer: state back to `Idle` and the
/// run control restored. It fires exactly once, whichever way the run
/// settles, including when the run future itself is dropped.
pub struct RunGuard<'a> {
    state: &'a Cell<RunState>,
    sink: &'a dyn EffectSink,
}

impl<'a> RunGuard<'a> {
    /// Enter `Submitting`. Returns `None` if a run is already in flight.
    pub fn acquire(state: &'a Cell<RunState>, sink: &'a dyn EffectSink) -> Option<Self> {
        if state.get() != RunState::Idle {
            return None;
        }
        state.set(RunState::Submitting);
        Some(Self { state, sink })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.set(RunState::Idle);
        self.sink.emit(UiEffect::RunControl(RunControl::ready()));
    }
}
