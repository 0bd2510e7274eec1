// src/store/mod.rs

//! Persistent preference storage.
//!
//! The page keeps a handful of values in an origin-scoped string store
//! (the browser's local storage, or a JSON file when running headless):
//! - `user_id`
//! - `sidebar_collapsed` ("true" / "false")
//! - `code_{problem_id}` draft code
//! - `solved_problems` (JSON array of ids)
//! - `solve_log` (JSON object date -> count)
//!
//! Components never touch a backend directly; they go through
//! [`PreferenceStore`], which owns the key layout and value encoding.

use anyhow::Result;

pub mod file;
pub mod memory;
pub mod prefs;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use prefs::{PreferenceStore, SolveLog, SolvedSet};

/// An origin-scoped string key-value store.
///
/// Reads and writes are synchronous and take `&self`: a store handle is
/// shared by every component on the page and there is no cross-tab
/// coordination (last writer wins).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Key names shared by every backend.
pub mod keys {
    pub const USER_ID: &str = "user_id";
    pub const SIDEBAR_COLLAPSED: &str = "sidebar_collapsed";
    pub const SOLVED_PROBLEMS: &str = "solved_problems";
    pub const SOLVE_LOG: &str = "solve_log";

    /// Draft key for a problem.
    ///
    /// Example:
    /// two_sum → code_two_sum
    pub fn draft(problem_id: &str) -> String {
        format!("code_{}", problem_id)
    }
}
