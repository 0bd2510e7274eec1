// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::editor::EditorSettings;
use crate::engine::advisory::{default_rules, AdvisoryRule};
use crate::progress::{SidebarLink, SidebarSection};
use crate::util::read_to_string;

/// Root configuration loaded from `config.yaml`.
///
/// This file controls:
/// - Which execution server to talk to
/// - Where client state (drafts, progress, layout) is persisted
/// - Editor settings and starter code
/// - Code advisories shown on submit
/// - The problem list shown in the sidebar
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub problem: ProblemConfig,
    pub editor: EditorSettings,

    /// Example:
    ///
    /// advisories:
    ///   - pattern: '\bprint\s*\('
    ///     message: "⚠️ Use return instead of print() inside solve()"
    pub advisories: Vec<AdvisoryRule>,

    pub sidebar: Vec<SectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            problem: ProblemConfig::default(),
            editor: EditorSettings::default(),
            advisories: default_rules(),
            sidebar: Vec::new(),
        }
    }
}

/// Execution server section.
///
/// server:
///   base_url: http://127.0.0.1:5000
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

/// Client state file.
///
/// Resolved relative to the location of config.yaml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: ".codepad/store.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProblemConfig {
    /// Starter code for problems without a draft.
    pub initial_code: String,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            initial_code: "def solve():\n    pass\n".to_string(),
        }
    }
}

/// One sidebar section.
///
/// sidebar:
///   - title: Day 1
///     problems:
///       - id: two-sum
///         title: Two Sum
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SectionConfig {
    pub title: String,
    #[serde(default)]
    pub problems: Vec<ProblemEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProblemEntry {
    pub id: String,
    pub title: String,
}

impl Config {
    /// Load and parse `config.yaml` from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&raw)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("Failed to parse YAML config")
    }

    /// Sidebar sections as shown on the page.
    pub fn sidebar_sections(&self) -> Vec<SidebarSection> {
        self.sidebar
            .iter()
            .map(|section| SidebarSection {
                title: section.title.clone(),
                links: section
                    .problems
                    .iter()
                    .map(|p| SidebarLink::new(format!("/problem/{}", p.id), p.title.clone()))
                    .collect(),
            })
            .collect()
    }

    pub fn knows_problem(&self, problem_id: &str) -> bool {
        self.sidebar
            .iter()
            .flat_map(|s| s.problems.iter())
            .any(|p| p.id == problem_id)
    }
}
