// src/store/prefs.rs

//! Typed accessors over a [`KeyValueStore`].
//!
//! This is the only place that knows how each preference is encoded.
//! JSON values that fail to parse are treated as empty (and logged),
//! matching how a fresh page would behave with a damaged entry.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{keys, KeyValueStore};

/// Problem ids solved so far, in the order they were first solved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolvedSet(Vec<String>);

impl SolvedSet {
    pub fn contains(&self, problem_id: &str) -> bool {
        self.0.iter().any(|id| id == problem_id)
    }

    /// Insert an id. Returns false if it was already present.
    pub fn insert(&mut self, problem_id: &str) -> bool {
        if self.contains(problem_id) {
            return false;
        }
        self.0.push(problem_id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Solve counts keyed by ISO calendar date (`YYYY-MM-DD`).
pub type SolveLog = BTreeMap<String, u32>;

/// Typed view of the page's persistent preferences.
#[derive(Debug, Clone)]
pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /* ---------------- drafts ---------------- */

    pub fn draft(&self, problem_id: &str) -> Option<String> {
        self.store.get(&keys::draft(problem_id))
    }

    pub fn save_draft(&self, problem_id: &str, code: &str) -> Result<()> {
        self.store.set(&keys::draft(problem_id), code)
    }

    pub fn clear_draft(&self, problem_id: &str) -> Result<()> {
        self.store.remove(&keys::draft(problem_id))
    }

    /* ---------------- progress ---------------- */

    pub fn solved(&self) -> SolvedSet {
        self.read_json(keys::SOLVED_PROBLEMS)
    }

    pub fn save_solved(&self, solved: &SolvedSet) -> Result<()> {
        self.write_json(keys::SOLVED_PROBLEMS, solved)
    }

    pub fn solve_log(&self) -> SolveLog {
        self.read_json(keys::SOLVE_LOG)
    }

    pub fn save_solve_log(&self, log: &SolveLog) -> Result<()> {
        self.write_json(keys::SOLVE_LOG, log)
    }

    /* ---------------- layout ---------------- */

    /// Anything other than the literal "true" reads as expanded.
    pub fn sidebar_collapsed(&self) -> bool {
        self.store.get(keys::SIDEBAR_COLLAPSED).as_deref() == Some("true")
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<()> {
        let value = if collapsed { "true" } else { "false" };
        self.store.set(keys::SIDEBAR_COLLAPSED, value)
    }

    /* ---------------- identity ---------------- */

    pub fn user_id(&self) -> Option<String> {
        self.store
            .get(keys::USER_ID)
            .filter(|id| !id.is_empty())
    }

    pub fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.store.set(keys::USER_ID, user_id)
    }

    /* ---------------- encoding ---------------- */

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.store.get(key) else {
            return T::default();
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable stored value");
                T::default()
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode {}", key))?;
        self.store.set(key, &raw)
    }
}
