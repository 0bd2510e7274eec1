// src/lib.rs

//! codepad
//!
//! Client-side orchestration for a coding-practice page:
//! - `engine`: the run flow (submit, render, settle)
//! - `render`: verdict → output view
//! - `progress`: solved set, solve log, sidebar markers, streaks
//! - `layout`: drag-to-resize panels and collapse toggles
//! - `workbench`: the page-lifetime context object wiring it together
//!
//! The browser page and the `codepad` CLI are both hosts: they feed events
//! into a `Workbench` and apply the `UiEffect`s it emits.

pub mod cli;
pub mod client;
pub mod config;
pub mod editor;
pub mod engine;
pub mod identity;
pub mod layout;
pub mod progress;
pub mod render;
pub mod runner;
pub mod sinks;
pub mod store;
pub mod terminal;
pub mod util;
pub mod verdict;
pub mod workbench;
