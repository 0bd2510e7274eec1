// src/workbench.rs

//! The practice page as one context object.
//!
//! A `Workbench` is created when the page loads and lives as long as the
//! page. It owns the page-wide mutable state (run state, layout geometry,
//! editor handle, user id) and wires the components together:
//! - pointer events → layout controller → editor re-layout
//! - run button / Ctrl+Enter → run orchestrator
//! - editor content changes → draft autosave
//!
//! Hosts feed it events and render the effects it emits.

use anyhow::Result;
use std::cell::RefCell;

use crate::client::ExecutionClient;
use crate::editor::Editor;
use crate::engine::{CodeAdvisor, EffectSink, RunOrchestrator, RunOutcome, RunState, UiEffect};
use crate::identity::{ensure_user_id, identity_cookie};
use crate::layout::{Frame, LayoutController, LayoutEffect, LayoutGeometry, Pointer, Resizer};
use crate::progress::{ProgressTracker, SidebarSection};
use crate::store::{KeyValueStore, PreferenceStore};

pub const DRAFT_RESTORED_TOAST: &str = "Draft restored";
pub const TRACK_SWITCH_FAILED: &str = "Failed to switch track";

/// Static description of the page being served.
#[derive(Debug, Clone)]
pub struct Page {
    pub problem_id: String,
    /// Starter code shown when no draft exists.
    pub initial_code: String,
    pub sidebar: Vec<SidebarSection>,
    pub advisor: CodeAdvisor,
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl+Enter, or Cmd+Enter on macOS.
    pub fn is_run_shortcut(&self) -> bool {
        (self.ctrl || self.meta) && self.key == "Enter"
    }
}

pub struct Workbench<S, E, C, K> {
    problem_id: String,
    initial_code: String,
    prefs: PreferenceStore<S>,
    editor: E,
    layout: RefCell<LayoutController>,
    orchestrator: RunOrchestrator<C, S>,
    sink: K,
    user_id: RefCell<Option<String>>,
}

impl<S, E, C, K> Workbench<S, E, C, K>
where
    S: KeyValueStore + Clone,
    E: Editor,
    C: ExecutionClient,
    K: EffectSink,
{
    pub fn new(page: Page, store: S, editor: E, client: C, sink: K) -> Self {
        let prefs = PreferenceStore::new(store);
        let progress = ProgressTracker::new(prefs.clone(), page.sidebar);
        let orchestrator =
            RunOrchestrator::new(page.problem_id.clone(), client, progress, page.advisor);

        Self {
            problem_id: page.problem_id,
            initial_code: page.initial_code,
            prefs,
            editor,
            layout: RefCell::new(LayoutController::new()),
            orchestrator,
            sink,
            user_id: RefCell::new(None),
        }
    }

    /* ---------------- lifecycle ---------------- */

    /// Page bootstrap: identity, sidebar markers, layout state, editor.
    pub fn load(&self) -> Result<()> {
        let user_id = ensure_user_id(&self.prefs)?;
        tracing::debug!(cookie = %identity_cookie(&user_id), "Identity ready");
        *self.user_id.borrow_mut() = Some(user_id);

        self.orchestrator.progress().annotate_sidebar(&self.sink);

        let restored = self.layout.borrow_mut().restore(&self.prefs);
        self.apply_layout(restored);

        self.open_editor();
        Ok(())
    }

    fn open_editor(&self) {
        match self.prefs.draft(&self.problem_id) {
            Some(draft) => {
                self.editor.set_text(&draft);
                self.sink
                    .emit(UiEffect::Toast(DRAFT_RESTORED_TOAST.to_string()));
                tracing::debug!(problem_id = %self.problem_id, "Draft restored");
            }
            None => self.editor.set_text(&self.initial_code),
        }

        self.focus_editor();
    }

    fn focus_editor(&self) {
        self.editor.focus();
        self.sink.emit(UiEffect::FocusEditor);
    }

    pub fn user_id(&self) -> Option<String> {
        self.user_id.borrow().clone()
    }

    /* ---------------- editor ---------------- */

    /// The editor reported an edit: autosave the draft.
    pub fn content_changed(&self) -> Result<()> {
        self.prefs.save_draft(&self.problem_id, &self.editor.text())
    }

    /// Replace the editor text as if the user had typed it.
    pub fn edit(&self, text: &str) -> Result<()> {
        self.editor.set_text(text);
        self.content_changed()
    }

    /// Restore the starter code and drop the draft. Does nothing unless
    /// the user confirmed.
    pub fn reset_code(&self, confirmed: bool) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }

        self.editor.set_text(&self.initial_code);
        self.prefs.clear_draft(&self.problem_id)?;
        self.focus_editor();
        tracing::info!(problem_id = %self.problem_id, "Code reset");
        Ok(true)
    }

    /* ---------------- running ---------------- */

    pub async fn run(&self) -> RunOutcome {
        self.orchestrator
            .run(&self.editor, &self.layout, &self.sink)
            .await
    }

    /// Global key handler. Returns the run outcome when the key was the
    /// run shortcut.
    pub async fn key_down(&self, key: &KeyPress) -> Option<RunOutcome> {
        if !key.is_run_shortcut() {
            return None;
        }
        Some(self.run().await)
    }

    pub fn run_state(&self) -> RunState {
        self.orchestrator.state()
    }

    /* ---------------- layout ---------------- */

    pub fn pointer_down(&self, resizer: Resizer) {
        let effects = self.layout.borrow_mut().pointer_down(resizer);
        self.apply_layout(effects);
    }

    pub fn pointer_move(&self, pointer: Pointer, frame: &Frame) {
        let effects = self.layout.borrow_mut().pointer_move(pointer, frame);
        self.apply_layout(effects);
    }

    pub fn pointer_up(&self) {
        let effects = self.layout.borrow_mut().pointer_up();
        self.apply_layout(effects);
    }

    pub fn toggle_sidebar(&self) -> Result<()> {
        let effects = self.layout.borrow_mut().toggle_sidebar(&self.prefs)?;
        self.apply_layout(effects);
        Ok(())
    }

    pub fn toggle_output(&self) {
        let effects = self.layout.borrow_mut().toggle_output();
        self.apply_layout(effects);
    }

    /// Hamburger button on narrow screens.
    pub fn toggle_mobile_sidebar(&self, viewport_width: f64) {
        let effects = self.layout.borrow_mut().toggle_mobile_sidebar(viewport_width);
        self.apply_layout(effects);
    }

    /// A problem link in the sidebar was followed.
    pub fn link_clicked(&self) {
        let effects = self.layout.borrow_mut().link_clicked();
        self.apply_layout(effects);
    }

    pub fn geometry(&self) -> LayoutGeometry {
        self.layout.borrow().geometry()
    }

    /// Editor re-layout is handled here; everything else goes to the host.
    fn apply_layout(&self, effects: Vec<LayoutEffect>) {
        for effect in effects {
            match effect {
                LayoutEffect::RelayoutEditor => self.editor.relayout(),
                other => self.sink.emit(UiEffect::Layout(other)),
            }
        }
    }

    /* ---------------- tracks ---------------- */

    /// Ask the server to switch the active track.
    ///
    /// Success reloads the page; any other answer, or no answer, raises an
    /// alert. An empty id does nothing.
    pub async fn switch_track(&self, track_id: &str) -> bool {
        if track_id.is_empty() {
            return false;
        }

        match self.orchestrator.client().switch_track(track_id).await {
            Ok(outcome) if outcome.is_ok() => {
                tracing::info!(track_id, "Track switched");
                self.sink.emit(UiEffect::Reload);
                true
            }
            Ok(outcome) => {
                tracing::warn!(track_id, status = %outcome.status, "Track switch refused");
                self.sink.emit(UiEffect::Alert(TRACK_SWITCH_FAILED.to_string()));
                false
            }
            Err(e) => {
                tracing::warn!(track_id, error = %e, "Track switch failed");
                self.sink.emit(UiEffect::Alert(TRACK_SWITCH_FAILED.to_string()));
                false
            }
        }
    }

    /* ---------------- accessors ---------------- */

    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn prefs(&self) -> &PreferenceStore<S> {
        &self.prefs
    }

    pub fn progress(&self) -> &ProgressTracker<S> {
        self.orchestrator.progress()
    }
}
