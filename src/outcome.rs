// Shape of the remote grader's reply.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One node of the grader's result tree, tagged by `t`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum ResultNode {
    /// `describe` block.
    Describe {
        #[serde(rename = "v")]
        label: String,
        #[serde(rename = "p")]
        passed: bool,
        #[serde(default)]
        items: Vec<ResultNode>,
    },
    /// `it` block.
    It {
        #[serde(rename = "v")]
        label: String,
        #[serde(rename = "p")]
        passed: bool,
        #[serde(default)]
        items: Vec<ResultNode>,
    },
    CompletedIn {
        #[serde(rename = "v", deserialize_with = "text_or_number")]
        millis: String,
    },
    Passed {
        #[serde(rename = "v")]
        text: String,
    },
    Failed {
        #[serde(rename = "v")]
        text: String,
    },
    Error {
        #[serde(rename = "v")]
        text: String,
    },
    Log {
        #[serde(rename = "v")]
        text: String,
    },
    /// Kinds this client does not know how to draw.
    #[serde(other)]
    Unknown,
}

/// Graded run as the renderer and the process exit code see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub timed_out: bool,
    pub wall_time_ms: u64,
    pub passed_count: u32,
    pub failed_count: u32,
    pub stderr: String,
    pub result_tree: Vec<ResultNode>,
    /// Token the platform expects back on the notify call.
    pub continuation_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunResponse {
    exit_code: i32,
    #[serde(default)]
    timed_out: bool,
    #[serde(default)]
    wall_time: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    stderr: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    token: String,
    #[serde(default)]
    result: Option<RunResult>,
}

#[derive(Deserialize, Default)]
struct RunResult {
    #[serde(default)]
    passed: u32,
    #[serde(default)]
    failed: u32,
    #[serde(default)]
    output: Vec<ResultNode>,
}

impl RunOutcome {
    /// Parse the grader's JSON reply. A missing `result` object (e.g. the
    /// code did not compile) yields an empty tree with zero counts.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        let res: RunResponse = serde_json::from_value(value)?;
        let result = res.result.unwrap_or_default();
        Ok(RunOutcome {
            exit_code: res.exit_code,
            timed_out: res.timed_out,
            wall_time_ms: res.wall_time,
            passed_count: result.passed,
            failed_count: result.failed,
            stderr: res.stderr,
            result_tree: result.output,
            continuation_token: res.token,
        })
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}
