// src/layout.rs

//! Resizable panel layout.
//!
//! Three boundaries can be dragged, each with its own `Idle → Dragging →
//! Idle` state machine:
//! - the sidebar's right edge (sidebar width, px)
//! - the problem/editor split (problem panel width, % of the container)
//! - the output panel's top edge (output height, px)
//!
//! Extents are only applied while they sit inside the legal range; a
//! pointer outside the range leaves the last applied extent in place
//! until it comes back. Nothing numeric is persisted: only the sidebar's
//! collapsed flag survives a reload.
//!
//! The controller produces [`LayoutEffect`]s instead of touching a UI, and
//! asks for an editor re-layout whenever a drag ends, because the editor
//! does not notice manual container resizes on its own.

use anyhow::Result;
use std::fmt;

use crate::store::{KeyValueStore, PreferenceStore};

pub const SIDEBAR_MIN_PX: f64 = 150.0;
pub const SIDEBAR_MAX_PX: f64 = 500.0;
pub const SPLIT_MIN_PERCENT: f64 = 20.0;
pub const SPLIT_MAX_PERCENT: f64 = 80.0;
pub const OUTPUT_MIN_PX: f64 = 50.0;
/// Upper bound for the output panel as a fraction of viewport height.
pub const OUTPUT_MAX_VIEWPORT_FRACTION: f64 = 0.6;
pub const HEADER_HEIGHT_PX: f64 = 58.0;
/// At or below this viewport width the sidebar is an overlay drawer.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resizer {
    Sidebar,
    PanelSplit,
    Output,
}

impl Resizer {
    pub const ALL: [Resizer; 3] = [Resizer::Sidebar, Resizer::PanelSplit, Resizer::Output];

    fn slot(self) -> usize {
        match self {
            Resizer::Sidebar => 0,
            Resizer::PanelSplit => 1,
            Resizer::Output => 2,
        }
    }
}

impl fmt::Display for Resizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resizer::Sidebar => "sidebar",
            Resizer::PanelSplit => "panel_split",
            Resizer::Output => "output",
        };
        f.write_str(name)
    }
}

/// Pointer position in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

/// Measurements of the page taken at the time of a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Right edge of the sidebar in client coordinates.
    pub sidebar_right: f64,
    /// Width of the container holding the problem and editor panels.
    pub container_width: f64,
}

/// Manually applied extents. `None` means "use the stylesheet default".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutGeometry {
    pub sidebar_width: Option<f64>,
    pub problem_percent: Option<f64>,
    pub output_height: Option<f64>,
    pub container_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEffect {
    /// Suppress the browser's native drag/selection for this pointer-down.
    PreventDefault(Resizer),
    /// "resizing" indicator on the handle.
    Indicator { resizer: Resizer, active: bool },
    SidebarWidth(Option<f64>),
    PanelSplit {
        problem_percent: f64,
        editor_percent: f64,
    },
    OutputHeight {
        output_px: f64,
        /// `viewport − header − output`, so both panels fill the viewport.
        container_px: f64,
    },
    OutputCollapsed(bool),
    SidebarCollapsed(bool),
    ShowSidebarButton(bool),
    /// Mobile drawer shown over the page.
    SidebarOpen(bool),
    RelayoutEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging,
}

#[derive(Debug)]
pub struct LayoutController {
    drags: [DragState; 3],
    geometry: LayoutGeometry,
    sidebar_collapsed: bool,
    output_collapsed: bool,
    sidebar_open: bool,
    /// Set once the drawer was toggled on a narrow viewport; from then on
    /// following a problem link closes it.
    close_on_link: bool,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutController {
    pub fn new() -> Self {
        Self {
            drags: [DragState::Idle; 3],
            geometry: LayoutGeometry::default(),
            sidebar_collapsed: false,
            output_collapsed: false,
            sidebar_open: false,
            close_on_link: false,
        }
    }

    /// Initial page state: output panel collapsed, sidebar as persisted.
    pub fn restore<S: KeyValueStore>(&mut self, prefs: &PreferenceStore<S>) -> Vec<LayoutEffect> {
        let mut effects = vec![LayoutEffect::OutputCollapsed(true)];
        self.output_collapsed = true;

        if prefs.sidebar_collapsed() {
            self.sidebar_collapsed = true;
            effects.push(LayoutEffect::SidebarCollapsed(true));
            effects.push(LayoutEffect::ShowSidebarButton(true));
        }

        effects
    }

    pub fn geometry(&self) -> LayoutGeometry {
        self.geometry
    }

    pub fn is_dragging(&self, resizer: Resizer) -> bool {
        self.drags[resizer.slot()] == DragState::Dragging
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn output_collapsed(&self) -> bool {
        self.output_collapsed
    }

    /* ---------------- drag lifecycle ---------------- */

    /// Start dragging a handle. A second pointer-down on a handle that is
    /// already dragging changes nothing.
    pub fn pointer_down(&mut self, resizer: Resizer) -> Vec<LayoutEffect> {
        if self.is_dragging(resizer) {
            return Vec::new();
        }

        self.drags[resizer.slot()] = DragState::Dragging;
        tracing::debug!(resizer = %resizer, "Resize started");

        vec![
            LayoutEffect::PreventDefault(resizer),
            LayoutEffect::Indicator {
                resizer,
                active: true,
            },
        ]
    }

    /// Feed a pointer move to every handle that is dragging.
    pub fn pointer_move(&mut self, pointer: Pointer, frame: &Frame) -> Vec<LayoutEffect> {
        let mut effects = Vec::new();

        for resizer in Resizer::ALL {
            if !self.is_dragging(resizer) {
                continue;
            }

            match resizer {
                Resizer::Sidebar => self.move_sidebar(pointer, &mut effects),
                Resizer::PanelSplit => self.move_split(pointer, frame, &mut effects),
                Resizer::Output => self.move_output(pointer, frame, &mut effects),
            }
        }

        effects
    }

    /// End every active drag. Each ended drag turns its indicator off and
    /// asks the editor to re-layout.
    pub fn pointer_up(&mut self) -> Vec<LayoutEffect> {
        let mut effects = Vec::new();

        for resizer in Resizer::ALL {
            if !self.is_dragging(resizer) {
                continue;
            }

            self.drags[resizer.slot()] = DragState::Idle;
            tracing::debug!(resizer = %resizer, geometry = ?self.geometry, "Resize finished");

            effects.push(LayoutEffect::Indicator {
                resizer,
                active: false,
            });
            effects.push(LayoutEffect::RelayoutEditor);
        }

        effects
    }

    fn move_sidebar(&mut self, pointer: Pointer, effects: &mut Vec<LayoutEffect>) {
        let width = pointer.x;
        if width > SIDEBAR_MIN_PX && width < SIDEBAR_MAX_PX {
            self.geometry.sidebar_width = Some(width);
            effects.push(LayoutEffect::SidebarWidth(Some(width)));
        }
    }

    fn move_split(&mut self, pointer: Pointer, frame: &Frame, effects: &mut Vec<LayoutEffect>) {
        if frame.container_width <= 0.0 {
            return;
        }

        let x = pointer.x - frame.sidebar_right;
        let percent = (x / frame.container_width) * 100.0;

        if percent > SPLIT_MIN_PERCENT && percent < SPLIT_MAX_PERCENT {
            self.geometry.problem_percent = Some(percent);
            effects.push(LayoutEffect::PanelSplit {
                problem_percent: percent,
                editor_percent: 100.0 - percent,
            });
        }
    }

    fn move_output(&mut self, pointer: Pointer, frame: &Frame, effects: &mut Vec<LayoutEffect>) {
        let viewport = frame.viewport_height;
        let height = viewport - pointer.y;

        if height > OUTPUT_MIN_PX && height < viewport * OUTPUT_MAX_VIEWPORT_FRACTION {
            let container = viewport - HEADER_HEIGHT_PX - height;
            self.geometry.output_height = Some(height);
            self.geometry.container_height = Some(container);

            effects.push(LayoutEffect::OutputHeight {
                output_px: height,
                container_px: container,
            });

            // A manual resize always shows the panel.
            if self.output_collapsed {
                self.output_collapsed = false;
                effects.push(LayoutEffect::OutputCollapsed(false));
            }
        }
    }

    /* ---------------- toggles ---------------- */

    /// Collapse or expand the sidebar and persist the new state.
    ///
    /// Any manual width is dropped so the collapsed style can take effect.
    pub fn toggle_sidebar<S: KeyValueStore>(
        &mut self,
        prefs: &PreferenceStore<S>,
    ) -> Result<Vec<LayoutEffect>> {
        self.geometry.sidebar_width = None;
        self.sidebar_collapsed = !self.sidebar_collapsed;
        prefs.set_sidebar_collapsed(self.sidebar_collapsed)?;

        Ok(vec![
            LayoutEffect::SidebarWidth(None),
            LayoutEffect::SidebarCollapsed(self.sidebar_collapsed),
            LayoutEffect::ShowSidebarButton(self.sidebar_collapsed),
        ])
    }

    pub fn toggle_output(&mut self) -> Vec<LayoutEffect> {
        self.output_collapsed = !self.output_collapsed;
        vec![LayoutEffect::OutputCollapsed(self.output_collapsed)]
    }

    /// Open or close the mobile sidebar drawer.
    pub fn toggle_mobile_sidebar(&mut self, viewport_width: f64) -> Vec<LayoutEffect> {
        self.sidebar_open = !self.sidebar_open;
        if viewport_width <= MOBILE_BREAKPOINT_PX {
            self.close_on_link = true;
        }
        vec![LayoutEffect::SidebarOpen(self.sidebar_open)]
    }

    /// A problem link in the sidebar was followed.
    pub fn link_clicked(&mut self) -> Vec<LayoutEffect> {
        if !(self.close_on_link && self.sidebar_open) {
            return Vec::new();
        }
        self.sidebar_open = false;
        vec![LayoutEffect::SidebarOpen(false)]
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Show the output panel. Empty when it is already visible.
    pub fn expand_output(&mut self) -> Vec<LayoutEffect> {
        if !self.output_collapsed {
            return Vec::new();
        }
        self.output_collapsed = false;
        vec![LayoutEffect::OutputCollapsed(false)]
    }
}
