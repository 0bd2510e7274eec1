use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

/// A pattern that, when found in submitted code, triggers a notice.
///
/// Example in config.yaml:
///
/// advisories:
///   - pattern: '\bprint\s*\('
///     message: "⚠️ Use return instead of print() inside solve()"
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AdvisoryRule {
    pub pattern: String,
    pub message: String,
}

pub fn default_rules() -> Vec<AdvisoryRule> {
    vec![AdvisoryRule {
        pattern: r"\bprint\s*\(".to_string(),
        message: "⚠️ Use return instead of print() inside solve()".to_string(),
    }]
}

/// Compiled advisory rules. Advisories never block a submission.
#[derive(Debug, Clone)]
pub struct CodeAdvisor {
    rules: Vec<(Regex, String)>,
}

impl CodeAdvisor {
    pub fn compile(rules: &[AdvisoryRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|r| {
                let re = Regex::new(&r.pattern)
                    .with_context(|| format!("Invalid advisory pattern: {}", r.pattern))?;
                Ok((re, r.message.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Messages for every rule matching `code`, in rule order.
    pub fn check(&self, code: &str) -> Vec<String> {
        self.rules
            .iter()
            .filter(|(re, _)| re.is_match(code))
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Default for CodeAdvisor {
    fn default() -> Self {
        // The built-in pattern is a literal and always compiles.
        Self::compile(&default_rules()).unwrap_or(Self { rules: Vec::new() })
    }
}
