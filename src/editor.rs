// src/editor.rs

//! The embedded code editor, seen as a capability.
//!
//! The page never depends on a concrete widget. It needs to:
//! - read and replace the text
//! - run the "format document" action (best-effort)
//! - ask the widget to recompute its layout after a manual resize
//! - focus it
//!
//! Content-change notifications flow the other way: the host calls
//! `Workbench::content_changed` whenever the widget reports an edit.

use anyhow::Result;
use serde::Deserialize;
use std::cell::{Cell, RefCell};

pub trait Editor {
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    /// Run the widget's document-format action.
    fn request_format(&self) -> Result<()>;

    fn relayout(&self);

    fn focus(&self) {}
}

/// Widget configuration handed to the editor when it is created.
///
/// Example in config.yaml:
///
/// editor:
///   language: python
///   tab_size: 4
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    pub language: String,
    pub theme: String,
    pub font_size: u32,
    pub font_family: String,
    pub line_height: u32,
    pub tab_size: usize,
    pub insert_spaces: bool,
    pub word_wrap: bool,
    pub format_on_paste: bool,
    pub format_on_type: bool,
    pub minimap: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            language: "python".to_string(),
            theme: "vs-dark".to_string(),
            font_size: 15,
            font_family: "JetBrains Mono, Fira Code, monospace".to_string(),
            line_height: 22,
            tab_size: 4,
            insert_spaces: true,
            word_wrap: true,
            format_on_paste: true,
            format_on_type: true,
            minimap: false,
        }
    }
}

/// A plain text buffer standing in for the widget (terminal host, tests).
///
/// Formatting strips trailing whitespace and, when `insert_spaces` is set,
/// expands tabs to `tab_size` spaces.
#[derive(Debug, Default)]
pub struct BufferEditor {
    text: RefCell<String>,
    settings: EditorSettings,
    relayouts: Cell<usize>,
    focused: Cell<bool>,
}

impl BufferEditor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            text: RefCell::new(String::new()),
            settings,
            relayouts: Cell::new(0),
            focused: Cell::new(false),
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Number of re-layout requests received.
    pub fn relayouts(&self) -> usize {
        self.relayouts.get()
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }
}

impl Editor for BufferEditor {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    fn request_format(&self) -> Result<()> {
        let formatted = format_source(&self.text.borrow(), &self.settings);
        *self.text.borrow_mut() = formatted;
        Ok(())
    }

    fn relayout(&self) {
        self.relayouts.set(self.relayouts.get() + 1);
    }

    fn focus(&self) {
        self.focused.set(true);
    }
}

fn format_source(source: &str, settings: &EditorSettings) -> String {
    let indent = " ".repeat(settings.tab_size);

    let mut out = source
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if settings.insert_spaces {
                line.replace('\t', &indent)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}
