use std::{process::ExitStatus, time::Duration};

use serde::{Deserialize, Serialize};

use super::testcase::TestCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub judge: JudgeCode,
    pub execution_time: Duration,

    /// `None` when the process was killed on timeout.
    pub output: Option<ProcessOutput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum JudgeCode {
    AC,
    WA,
    TLE,
    RE,
}

impl JudgeCode {
    pub fn judge(testcase: &TestCase, status: ExitStatus, stdout: &str, stderr: &str) -> Self {
        if !status.success() {
            return JudgeCode::RE;
        }
        let passed = match testcase.expected() {
            Some(expected) => normalize_output(stdout) == normalize_output(expected),
            // Weak signal: a silent program that exits cleanly passes.
            None => stderr.is_empty(),
        };
        if passed {
            JudgeCode::AC
        } else {
            JudgeCode::WA
        }
    }
}

/// Trims surrounding whitespace and unifies CRLF into LF.
///
/// ```
/// use assay_core::testing::normalize_output;
///
/// assert_eq!(normalize_output("  a\r\nb\r\n\n"), "a\nb");
/// assert_eq!(normalize_output("Hello"), normalize_output("Hello\r\n"));
/// assert_ne!(normalize_output("hello"), normalize_output("Hello"));
/// ```
pub fn normalize_output(s: &str) -> String {
    s.trim().replace("\r\n", "\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationResult {
    pub success: bool,
    pub output: String,
}

impl CompilationResult {
    pub const SUCCESS_MARKER: &str = "Compilation successful";

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }

    /// Picks stderr if present, else stdout, else [`Self::SUCCESS_MARKER`].
    pub fn diagnostics(stdout: &str, stderr: &str) -> String {
        [stderr, stdout]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(Self::SUCCESS_MARKER)
            .to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_case_id: String,
    pub name: String,
    pub passed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(
        default,
        with = "serdable::opt_duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_time: Option<Duration>,
}

impl TestResult {
    pub const PASSED_MESSAGE: &str = "Test passed successfully";

    pub fn from_outcome(testcase: &TestCase, outcome: &RunOutcome) -> Self {
        let stderr = outcome
            .output
            .as_ref()
            .map(|o| o.stderr.trim_end())
            .unwrap_or_default();

        let message = match outcome.judge {
            JudgeCode::AC => Self::PASSED_MESSAGE.to_owned(),
            JudgeCode::WA => with_stderr("Test failed.".to_owned(), stderr),
            JudgeCode::RE => {
                let head = match outcome.output.as_ref().and_then(|o| o.status) {
                    Some(code) => format!("Runtime error (exit code {}).", code),
                    None => "Runtime error (terminated by signal).".to_owned(),
                };
                with_stderr(head, stderr)
            }
            JudgeCode::TLE => format!(
                "Time limit exceeded ({}ms)",
                outcome.execution_time.as_millis()
            ),
        };

        Self {
            test_case_id: testcase.id.clone(),
            name: testcase.name.clone(),
            passed: outcome.judge == JudgeCode::AC,
            message: Some(message),
            execution_time: Some(outcome.execution_time),
        }
    }

    /// A case whose invocation itself failed (spawn error, fixture I/O, ...).
    pub fn errored(testcase: &TestCase, error: &anyhow::Error) -> Self {
        Self {
            test_case_id: testcase.id.clone(),
            name: testcase.name.clone(),
            passed: false,
            message: Some(format!("Error running test: {:#}", error)),
            execution_time: None,
        }
    }

    pub fn execution_millis(&self) -> Option<f64> {
        self.execution_time.map(|d| d.as_secs_f64() * 1000.0)
    }
}

fn with_stderr(head: String, stderr: &str) -> String {
    if stderr.is_empty() {
        head
    } else {
        format!("{} {}", head, stderr)
    }
}
