// src/terminal.rs

//! Effect sink for the CLI host.
//!
//! Results go to stdout; everything else (notices, toasts, alerts,
//! progress hints) goes to stderr so stdout can be piped.

use std::io::IsTerminal;

use crate::engine::{EffectSink, UiEffect};
use crate::render::{to_text, OutputView};

pub struct TerminalSink {
    use_color: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            use_color: should_use_color(),
        }
    }

    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectSink for TerminalSink {
    fn emit(&self, effect: UiEffect) {
        match effect {
            UiEffect::Output(view @ OutputView::Running) => {
                eprintln!("{}", to_text(&view, self.use_color));
            }
            UiEffect::Output(view) => println!("{}", to_text(&view, self.use_color)),
            UiEffect::Advisory(message) => eprintln!("{}", message),
            UiEffect::Toast(message) => eprintln!("{}", message),
            UiEffect::Alert(message) => eprintln!("! {}", message),
            UiEffect::Reload => eprintln!("Track switched."),
            // Page chrome has no terminal counterpart.
            other => tracing::trace!(effect = ?other, "Ignored effect"),
        }
    }
}

pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}
