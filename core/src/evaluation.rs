use anyhow::{bail, Context as _};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{self, PerformanceMetrics, QualityFeedback},
    config::Config,
    problem::{Problem, ProblemId},
    sandbox::{self, ScratchRoot, Workspace},
    testing::{TestCommand, TestResult, TestRunner},
};

/// Source text submitted for one problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub code: String,
    #[serde(default = "Submission::default_language")]
    pub language: String,
    pub problem_id: ProblemId,
    /// Informational only. The file on disk is named after the public class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Submission {
    pub const DEFAULT_LANGUAGE: &str = "java";

    fn default_language() -> String {
        Self::DEFAULT_LANGUAGE.to_owned()
    }

    pub fn new(code: impl Into<String>, problem_id: ProblemId) -> Self {
        Self {
            code: code.into(),
            language: Self::default_language(),
            problem_id,
            filename: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub success: bool,
    pub compilation_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compilation_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Vec<TestResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_feedback: Option<Vec<QualityFeedback>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,
}

impl EvaluationResult {
    pub const NO_CLASS_NAME: &str = "Could not determine class name from the code.";

    pub fn compile_failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            compilation_successful: false,
            compilation_output: Some(output.into()),
            test_results: None,
            quality_feedback: None,
            performance_metrics: None,
        }
    }

    pub fn errored(error: &anyhow::Error) -> Self {
        Self::compile_failed(format!("Error: {:#}", error))
    }

    pub fn passed_count(&self) -> usize {
        self.test_results
            .iter()
            .flatten()
            .filter(|r| r.passed)
            .count()
    }
}

/// Runs the whole compile, test and review pipeline for one submission at a time.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: Config,
    root: ScratchRoot,
}

impl Evaluator {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let root = ScratchRoot::ensure(&config.sandbox.scratch_root)
            .context("Failed to prepare the scratch root")?;
        log::debug!("Scratch root: {:?}", root.path());
        Ok(Self { config, root })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn supports(&self, language: &str) -> bool {
        language == self.config.toolchain.language
    }

    /// Never fails. Errors end up in `compilationOutput` as `"Error: ..."`.
    pub async fn evaluate(&self, submission: &Submission, problem: &Problem) -> EvaluationResult {
        log::info!(
            "Evaluating a {} submission ({}) for problem {}",
            submission.language,
            submission.filename.as_deref().unwrap_or("unnamed"),
            problem.id
        );

        let ws = match Workspace::acquire(&self.root) {
            Ok(ws) => ws,
            Err(e) => {
                let e = anyhow::Error::new(e).context("Failed to create a workspace");
                log::error!("{:#}", e);
                return EvaluationResult::errored(&e);
            }
        };

        let res = match self.evaluate_in(&ws, submission, problem).await {
            Ok(res) => res,
            Err(e) => {
                log::error!("Evaluation failed: {:#}", e);
                EvaluationResult::errored(&e)
            }
        };
        ws.release();

        log::info!(
            "Evaluation finished: compiled={}, passed {}/{}",
            res.compilation_successful,
            res.passed_count(),
            res.test_results.as_ref().map_or(0, Vec::len)
        );
        res
    }

    async fn evaluate_in(
        &self,
        ws: &Workspace,
        submission: &Submission,
        problem: &Problem,
    ) -> anyhow::Result<EvaluationResult> {
        let toolchain = &self.config.toolchain;
        if !self.supports(&submission.language) {
            bail!("Unsupported language '{}'", submission.language);
        }

        let Some(class_name) = sandbox::extract_class_name(&submission.code) else {
            return Ok(EvaluationResult::compile_failed(EvaluationResult::NO_CLASS_NAME));
        };

        let source = sandbox::materialize(
            ws,
            class_name,
            &toolchain.source_extension,
            &submission.code,
        )?;

        let runner = TestRunner::new(TestCommand::from(toolchain), ws.path())
            .shell(&toolchain.shell)
            .limits(&self.config.limits)
            .program_file(&source)
            .context("Invalid toolchain command template")?;

        let compilation = runner.compile().await;
        if !compilation.success {
            return Ok(EvaluationResult::compile_failed(compilation.output));
        }

        let test_results = runner.run_all(&problem.test_cases).await;
        let analysis = analysis::analyze(&submission.code, &test_results);

        Ok(EvaluationResult {
            success: true,
            compilation_successful: true,
            compilation_output: Some(compilation.output),
            test_results: Some(test_results),
            quality_feedback: Some(analysis.feedback),
            performance_metrics: Some(analysis.metrics),
        })
    }
}

#[cfg(test)]
mod test {
    use std::{collections::BTreeMap, path::Path, time::Duration};

    use super::*;
    use crate::{config::ToolchainConfig, testing::TestCase};

    /// Sources are shell scripts; "compiling" copies them next to themselves.
    fn shell_config(scratch_root: &Path) -> Config {
        let mut cfg = Config::default();
        cfg.toolchain = ToolchainConfig {
            compile: "cp #{fileName} #{fileStem}.class".to_owned(),
            run: "sh #{fileStem}.class".to_owned(),
            ..ToolchainConfig::default()
        };
        cfg.limits.run_timeout = Duration::from_millis(300);
        cfg.sandbox.scratch_root = scratch_root.to_owned();
        cfg
    }

    fn problem(test_cases: Vec<TestCase>) -> Problem {
        Problem {
            id: 1,
            title: "Echo".to_owned(),
            description: String::new(),
            difficulty: "Easy".to_owned(),
            complexity_level: 1,
            category: "Basics".to_owned(),
            test_cases,
            solution_template: BTreeMap::new(),
        }
    }

    fn assert_scratch_root_is_empty(root: &Path) {
        let left: Vec<_> = std::fs::read_dir(root).unwrap().collect();
        assert!(left.is_empty(), "workspaces left behind: {:?}", left);
    }

    #[tokio::test]
    async fn no_public_class() {
        let tmp = tempfile::tempdir().unwrap();
        let ev = Evaluator::new(shell_config(tmp.path())).unwrap();
        let p = problem(vec![TestCase::new("1", "a").expected_output("x")]);

        let res = ev.evaluate(&Submission::new("class Hidden {}", 1), &p).await;
        assert_eq!(
            res,
            EvaluationResult::compile_failed(EvaluationResult::NO_CLASS_NAME)
        );
        assert_scratch_root_is_empty(tmp.path());
    }

    #[tokio::test]
    async fn one_result_per_testcase_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let ev = Evaluator::new(shell_config(tmp.path())).unwrap();
        let p = problem(vec![
            TestCase::new("1", "exact").expected_output("Hello"),
            TestCase::new("2", "case sensitive").expected_output("hello"),
            TestCase::new("3", "no expectation"),
        ]);
        let code = "# public class Hello\nprintf 'Hello\\r\\n'\n";

        let res = ev.evaluate(&Submission::new(code, 1), &p).await;
        assert!(res.success);
        assert!(res.compilation_successful);
        assert_eq!(res.compilation_output.as_deref(), Some("Compilation successful"));

        let results = res.test_results.as_ref().unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.test_case_id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        let passed: Vec<_> = results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, [true, false, true]);
        assert!(results.iter().all(|r| r.execution_time.is_some()));

        assert!(res.quality_feedback.is_some());
        let m = res.performance_metrics.unwrap();
        for (_, v) in m.as_array() {
            assert!((1..=10).contains(&v));
        }
        assert_scratch_root_is_empty(tmp.path());
    }

    #[tokio::test]
    async fn compile_error_skips_tests() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = shell_config(tmp.path());
        cfg.toolchain.compile = "echo '#{fileName}:1: error: ; expected' >&2; exit 1".to_owned();
        let ev = Evaluator::new(cfg).unwrap();
        let p = problem(vec![TestCase::new("1", "a")]);

        let res = ev
            .evaluate(&Submission::new("public class Broken {", 1), &p)
            .await;
        assert!(!res.success);
        assert!(!res.compilation_successful);
        assert_eq!(
            res.compilation_output.as_deref(),
            Some("Broken.java:1: error: ; expected\n")
        );
        assert_eq!(res.test_results, None);
        assert_eq!(res.quality_feedback, None);
        assert_scratch_root_is_empty(tmp.path());
    }

    #[tokio::test]
    async fn hanging_program_times_out() {
        let tmp = tempfile::tempdir().unwrap();
        let ev = Evaluator::new(shell_config(tmp.path())).unwrap();
        let p = problem(vec![
            TestCase::new("1", "quick").input("one\n").expected_output("one"),
            TestCase::new("2", "hangs").input("hang\n").expected_output("hang"),
            TestCase::new("3", "quick again").input("three\n").expected_output("three"),
        ]);
        let code = "# public class Loop\nread x\nif [ \"$x\" = hang ]; then sleep 5; fi\necho \"$x\"\n";

        let res = ev.evaluate(&Submission::new(code, 1), &p).await;
        assert!(res.success);
        let results = res.test_results.unwrap();
        let passed: Vec<_> = results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, [true, false, true]);
        assert!(results[1]
            .message
            .as_deref()
            .unwrap()
            .starts_with("Time limit exceeded"));
        assert_scratch_root_is_empty(tmp.path());
    }

    #[tokio::test]
    async fn unsupported_language_is_an_error_result() {
        let tmp = tempfile::tempdir().unwrap();
        let ev = Evaluator::new(shell_config(tmp.path())).unwrap();
        let mut sub = Submission::new("public class A {}", 1);
        sub.language = "python".to_owned();

        let res = ev.evaluate(&sub, &problem(vec![])).await;
        assert!(!res.success);
        assert!(!res.compilation_successful);
        assert_eq!(
            res.compilation_output.as_deref(),
            Some("Error: Unsupported language 'python'")
        );
        assert_scratch_root_is_empty(tmp.path());
    }

    #[test]
    fn wire_shape() {
        let res = EvaluationResult::compile_failed("boom");
        assert_eq!(
            serde_json::to_string(&res).unwrap(),
            r#"{"success":false,"compilationSuccessful":false,"compilationOutput":"boom"}"#
        );

        let sub: Submission =
            serde_json::from_str(r#"{"code":"x","problemId":5,"filename":"Main.java"}"#).unwrap();
        assert_eq!(sub.language, "java");
        assert_eq!(sub.problem_id, 5);
        assert_eq!(sub.filename.as_deref(), Some("Main.java"));
    }
}
