// src/verdict.rs

//! Wire types for the execution endpoint.
//!
//! Request:  `{"code": "...", "problem_id": "..."}`
//! Response: `{"passed": bool, "details": [TestOutcome...]}`
//!
//! Each detail is a flat object tagged by `status`. The raw shape is
//! decoded first and then lifted into [`OutcomeKind`], so a status the
//! client does not know about still decodes (as `Unknown`) instead of
//! failing the whole verdict.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRequest {
    pub code: String,
    pub problem_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub details: Vec<TestOutcome>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireOutcome")]
pub struct TestOutcome {
    /// 1-based ordinal assigned by the server.
    pub index: u32,
    pub kind: OutcomeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeKind {
    Passed,
    Failed {
        input: Value,
        expected: Value,
        got: Value,
    },
    Error {
        input: Option<Value>,
        error: String,
    },
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct WireOutcome {
    #[serde(default)]
    index: u32,
    status: String,
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    expected: Option<Value>,
    #[serde(default)]
    got: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl From<WireOutcome> for TestOutcome {
    fn from(w: WireOutcome) -> Self {
        let kind = match w.status.as_str() {
            "passed" => OutcomeKind::Passed,
            "failed" => OutcomeKind::Failed {
                input: w.input.unwrap_or(Value::Null),
                expected: w.expected.unwrap_or(Value::Null),
                got: w.got.unwrap_or(Value::Null),
            },
            "error" => OutcomeKind::Error {
                input: w.input.filter(|v| !v.is_null()),
                error: w.error.as_ref().map(display_value).unwrap_or_default(),
            },
            other => OutcomeKind::Unknown(other.to_string()),
        };

        TestOutcome {
            index: w.index,
            kind,
        }
    }
}

/// Text form of a JSON value as it appears inline in the output panel.
///
/// Strings are printed raw; everything else is compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
