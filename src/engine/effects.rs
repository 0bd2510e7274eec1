use crate::layout::LayoutEffect;
use crate::progress::SidebarSection;
use crate::render::OutputView;

pub const RUN_LABEL: &str = "▶ Run";
pub const RUNNING_LABEL: &str = "Running...";

/// State of the run button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl RunControl {
    pub fn ready() -> Self {
        Self {
            enabled: true,
            label: RUN_LABEL,
        }
    }

    pub fn running() -> Self {
        Self {
            enabled: false,
            label: RUNNING_LABEL,
        }
    }
}

/// A declarative UI instruction.
///
/// Components never touch the UI; they emit effects and the host binds
/// them to whatever it renders into.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    RunControl(RunControl),
    Output(OutputView),
    /// Non-blocking notice about the submitted code.
    Advisory(String),
    /// Transient acknowledgment.
    Toast(String),
    /// Blocking alert.
    Alert(String),
    Sidebar(Vec<SidebarSection>),
    Layout(LayoutEffect),
    FocusEditor,
    Reload,
}
