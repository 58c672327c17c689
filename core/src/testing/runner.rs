use std::{
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use anyhow::{bail, Context};
use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};
use tokio::process::Command;

use super::{
    capture::{self, Captured},
    result::*,
    testcase::*,
};
use crate::{
    config::{LimitsConfig, ToolchainConfig},
    str_interp::{FileVars, InterpError},
};

/// Toolchain command templates, or their expansion for one program file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    pub compile: String,
    pub run: String,
    pub artifact: String,
}

impl From<&ToolchainConfig> for TestCommand {
    fn from(cfg: &ToolchainConfig) -> Self {
        Self {
            compile: cfg.compile.clone(),
            run: cfg.run.clone(),
            artifact: cfg.artifact.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    cmd: TestCommand,
    shell: PathBuf,
    workdir: PathBuf,
    compile_time_limit: Duration,
    execution_time_limit: Duration,
    capture_max_bytes: usize,
}

enum Exec {
    Finished {
        status: ExitStatus,
        stdout: Captured,
        stderr: Captured,
        elapsed: Duration,
    },
    TimedOut {
        elapsed: Duration,
    },
}

impl TestRunner {
    const DEFAULT_SHELL: &str = "/bin/sh";

    /// `workdir` is where every command runs and where fixtures are written.
    pub fn new(cmd: TestCommand, workdir: impl Into<PathBuf>) -> Self {
        let limits = LimitsConfig::default();
        Self {
            cmd,
            shell: Self::DEFAULT_SHELL.into(),
            workdir: workdir.into(),
            compile_time_limit: limits.compile_timeout,
            execution_time_limit: limits.run_timeout,
            capture_max_bytes: limits.output_capture_max_bytes,
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn limits(mut self, limits: &LimitsConfig) -> Self {
        self.compile_time_limit = limits.compile_timeout;
        self.execution_time_limit = limits.run_timeout;
        self.capture_max_bytes = limits.output_capture_max_bytes;
        self
    }

    pub fn execution_time_limit(mut self, limit: Duration) -> Self {
        self.execution_time_limit = limit;
        self
    }

    /// Expands the command templates against `filepath`.
    pub fn program_file(mut self, filepath: impl AsRef<Path>) -> Result<Self, InterpError> {
        let vars = FileVars::new(filepath.as_ref());
        self.cmd = TestCommand {
            compile: vars.interp(&self.cmd.compile)?,
            run: vars.interp(&self.cmd.run)?,
            artifact: vars.interp(&self.cmd.artifact)?,
        };
        Ok(self)
    }

    pub fn get_command(&self) -> &TestCommand {
        &self.cmd
    }

    pub fn get_workdir(&self) -> &Path {
        &self.workdir
    }

    /// Never fails: every error is folded into an unsuccessful [`CompilationResult`].
    pub async fn compile(&self) -> CompilationResult {
        log::debug!("Compiling: {}", self.cmd.compile);
        self.try_compile().await.unwrap_or_else(|e| {
            log::warn!("Compilation aborted: {:#}", e);
            CompilationResult::failed(format!("{:#}", e))
        })
    }

    async fn try_compile(&self) -> anyhow::Result<CompilationResult> {
        let (stdout, stderr) = match self
            .exec(&self.cmd.compile, Stdio::null(), self.compile_time_limit)
            .await?
        {
            Exec::TimedOut { elapsed } => {
                bail!("Compilation timed out after {}ms", elapsed.as_millis())
            }
            Exec::Finished {
                status,
                stdout,
                stderr,
                ..
            } => {
                log::debug!("Compiler exited with {}", status);
                (stdout.into_string_lossy(), stderr.into_string_lossy())
            }
        };

        // The exit code is not trusted: warnings on stderr may come with either status.
        let artifact = self.workdir.join(&self.cmd.artifact);
        let success = tokio::fs::metadata(&artifact)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);

        Ok(CompilationResult {
            success,
            output: CompilationResult::diagnostics(&stdout, &stderr),
        })
    }

    pub async fn run(&self, testcase: &TestCase) -> anyhow::Result<RunOutcome> {
        let stdin = match testcase.stdin_fixture() {
            Some(input) => {
                let path = self.workdir.join(testcase.fixture_filename());
                tokio::fs::write(&path, input)
                    .await
                    .with_context(|| format!("Failed to write input fixture {:?}", path))?;
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("Failed to open input fixture {:?}", path))?;
                Stdio::from(file.into_std().await)
            }
            None => Stdio::null(),
        };

        let outcome = match self
            .exec(&self.cmd.run, stdin, self.execution_time_limit)
            .await?
        {
            Exec::TimedOut { elapsed } => RunOutcome {
                judge: JudgeCode::TLE,
                execution_time: elapsed,
                output: None,
            },
            Exec::Finished {
                status,
                stdout,
                stderr,
                elapsed,
            } => {
                if stdout.truncated || stderr.truncated {
                    log::warn!(
                        "Output of testcase '{}' exceeded {} bytes and was truncated",
                        testcase.name,
                        self.capture_max_bytes
                    );
                }
                let stdout = stdout.into_string_lossy();
                let stderr = stderr.into_string_lossy();
                RunOutcome {
                    judge: JudgeCode::judge(testcase, status, &stdout, &stderr),
                    execution_time: elapsed,
                    output: Some(ProcessOutput {
                        status: status.code(),
                        stdout,
                        stderr,
                    }),
                }
            }
        };
        Ok(outcome)
    }

    /// Runs every testcase in order. A failing case never stops the others.
    pub async fn run_all(&self, testcases: &[TestCase]) -> Vec<TestResult> {
        log::debug!("Running: {}", self.cmd.run);

        let mut results = Vec::with_capacity(testcases.len());
        for t in testcases {
            let res = match self.run(t).await {
                Ok(outcome) => {
                    log::debug!(
                        "Testcase {} ... {} [{}ms]",
                        t.name,
                        outcome.judge,
                        outcome.execution_time.as_millis()
                    );
                    TestResult::from_outcome(t, &outcome)
                }
                Err(e) => {
                    log::warn!("Testcase {} could not be run: {:#}", t.name, e);
                    TestResult::errored(t, &e)
                }
            };
            results.push(res);
        }
        results
    }

    async fn exec(&self, cmd: &str, stdin: Stdio, limit: Duration) -> anyhow::Result<Exec> {
        let start_at = tokio::time::Instant::now();

        let mut proc = Command::new(&self.shell)
            .args(["-c", cmd])
            .current_dir(&self.workdir)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .process_group(0)
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to spawn '{} -c {}'",
                    self.shell.to_string_lossy(),
                    cmd
                )
            })?;
        let pgid = proc.id().context("Spawned process has no pid")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let res = tokio::time::timeout(limit, async {
            tokio::try_join!(
                capture::read_capped(&mut stdout, self.capture_max_bytes),
                capture::read_capped(&mut stderr, self.capture_max_bytes),
                proc.wait()
            )
            .context("Failed to communicate with subprocess")
        })
        .await;

        let elapsed = start_at.elapsed();

        // Background jobs and grandchildren outlive the shell otherwise.
        kill_process_group(pgid);

        match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill timed-out process: {:#}", e));
                Ok(Exec::TimedOut { elapsed })
            }
            Ok(Err(e)) => Err(e),
            Ok(Ok((stdout, stderr, status))) => Ok(Exec::Finished {
                status,
                stdout,
                stderr,
                elapsed,
            }),
        }
    }
}

/// Sends SIGKILL to every process left in the group led by `pgid`.
fn kill_process_group(pgid: u32) {
    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    match signal::killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => log::warn!("Failed to kill process group {}: {}", pgid, e),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// A stand-in toolchain: the "compiler" copies the source, the "runtime" is `sh`.
    fn shell_toolchain() -> TestCommand {
        TestCommand {
            compile: "cp #{fileName} #{fileStem}.class".to_owned(),
            run: "sh #{fileStem}.class".to_owned(),
            artifact: "#{fileStem}.class".to_owned(),
        }
    }

    async fn prepared_runner(dir: &Path, script: &str) -> TestRunner {
        let src = dir.join("Prog.java");
        fsutil::write(&src, script).unwrap();
        let runner = TestRunner::new(shell_toolchain(), dir)
            .execution_time_limit(Duration::from_millis(300))
            .program_file(&src)
            .unwrap();
        let res = runner.compile().await;
        assert!(res.success, "{:?}", res);
        runner
    }

    #[tokio::test]
    async fn program_file_expands_templates() {
        let r = TestRunner::new(TestCommand::from(&ToolchainConfig::default()), "/ws")
            .program_file("/ws/Main.java")
            .unwrap();
        assert_eq!(
            r.get_command(),
            &TestCommand {
                compile: "javac Main.java".to_owned(),
                run: "java Main".to_owned(),
                artifact: "Main.class".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn compile_success_is_decided_by_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("Prog.java");
        fsutil::write(&src, "echo hi").unwrap();

        // Exits non-zero but leaves the artifact behind.
        let noisy = TestCommand {
            compile: "cp #{fileName} #{fileStem}.class; echo 'warning: deprecated' >&2; exit 1"
                .to_owned(),
            ..shell_toolchain()
        };
        let res = TestRunner::new(noisy, tmp.path())
            .program_file(&src)
            .unwrap()
            .compile()
            .await;
        assert!(res.success);
        assert_eq!(res.output, "warning: deprecated\n");

        // Exits zero without producing anything.
        let lazy = TestCommand {
            compile: "echo done".to_owned(),
            artifact: "#{fileStem}.bin".to_owned(),
            ..shell_toolchain()
        };
        let res = TestRunner::new(lazy, tmp.path())
            .program_file(&src)
            .unwrap()
            .compile()
            .await;
        assert!(!res.success);
        assert_eq!(res.output, "done\n");
    }

    #[tokio::test]
    async fn compile_reports_marker_when_silent() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = prepared_runner(tmp.path(), "true").await;
        assert_eq!(
            runner.compile().await.output,
            CompilationResult::SUCCESS_MARKER
        );
    }

    #[tokio::test]
    async fn compile_spawn_error_is_folded() {
        let tmp = tempfile::tempdir().unwrap();
        let res = TestRunner::new(shell_toolchain(), tmp.path())
            .shell("/definitely/not/a/shell")
            .compile()
            .await;
        assert!(!res.success);
        assert!(res.output.contains("Failed to spawn"), "{}", res.output);
    }

    #[tokio::test]
    async fn should_be_ac_with_stdin_fixture() {
        let tmp = tempfile::tempdir().unwrap();
        let r = prepared_runner(tmp.path(), "read x; echo \"hello_$x\"").await;
        let t = TestCase::new("1", "greet")
            .input("123\n")
            .expected_output("hello_123");
        let res = r.run(&t).await.unwrap();
        assert_eq!(res.judge, JudgeCode::AC);
        assert_eq!(
            res.output,
            Some(ProcessOutput {
                status: Some(0),
                stdout: "hello_123\n".into(),
                stderr: "".into(),
            })
        );
        assert!(tmp.path().join("input_1.txt").is_file());
    }

    #[tokio::test]
    async fn should_be_ac_with_crlf_output() {
        let tmp = tempfile::tempdir().unwrap();
        let r = prepared_runner(tmp.path(), "printf 'Hello\\r\\n'").await;
        let t = TestCase::new("1", "crlf").expected_output("Hello");
        assert_eq!(r.run(&t).await.unwrap().judge, JudgeCode::AC);
    }

    #[tokio::test]
    async fn should_be_wa_on_case_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let r = prepared_runner(tmp.path(), "echo hello").await;
        let t = TestCase::new("1", "case").expected_output("Hello");
        assert_eq!(r.run(&t).await.unwrap().judge, JudgeCode::WA);
    }

    #[tokio::test]
    async fn should_be_wa_without_expectation_when_stderr_is_written() {
        let tmp = tempfile::tempdir().unwrap();
        let r = prepared_runner(tmp.path(), "echo oops >&2").await;
        let t = TestCase::new("1", "no expectation");
        let res = r.run(&t).await.unwrap();
        assert_eq!(res.judge, JudgeCode::WA);
        assert_eq!(res.output.unwrap().stderr, "oops\n");
    }

    #[tokio::test]
    async fn should_be_re_even_if_stdout_is_correct() {
        let tmp = tempfile::tempdir().unwrap();
        let r = prepared_runner(tmp.path(), "echo Hello; exit 42").await;
        let t = TestCase::new("1", "exit").expected_output("Hello");
        let res = r.run(&t).await.unwrap();
        assert_eq!(res.judge, JudgeCode::RE);
        assert_eq!(res.output.unwrap().status, Some(42));
    }

    #[tokio::test]
    async fn should_be_tle() {
        let tmp = tempfile::tempdir().unwrap();
        let r = prepared_runner(tmp.path(), "sleep 5").await;
        let t = TestCase::new("1", "hang").expected_output("never");
        let res = r.run(&t).await.unwrap();
        assert_eq!(res.judge, JudgeCode::TLE);
        assert_eq!(res.output, None);
        assert!(res.execution_time < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn tle_kills_grandchildren() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("leaked");
        let script = format!("sleep 1; touch '{}'", marker.to_string_lossy());
        let r = prepared_runner(tmp.path(), &script).await;

        let res = r.run(&TestCase::new("1", "hang")).await.unwrap();
        assert_eq!(res.judge, JudgeCode::TLE);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "a child of the timed-out program kept running");
    }

    #[tokio::test]
    async fn background_job_is_reaped_after_exit() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("leaked");
        let script = format!(
            "(sleep 1; touch '{}') </dev/null >/dev/null 2>&1 &\necho done",
            marker.to_string_lossy()
        );
        let r = prepared_runner(tmp.path(), &script).await;

        let res = r.run(&TestCase::new("1", "bg").expected_output("done")).await.unwrap();
        assert_eq!(res.judge, JudgeCode::AC);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "a background job outlived the run");
    }

    #[tokio::test]
    async fn run_all_keeps_order_and_isolates_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let r = prepared_runner(tmp.path(), "read x; [ \"$x\" = hang ] && sleep 5; echo \"$x\"").await;
        let cases = vec![
            TestCase::new("a", "first").input("one\n").expected_output("one"),
            TestCase::new("b", "second").input("hang\n").expected_output("hang"),
            TestCase::new("c", "third").input("three\n").expected_output("3"),
            TestCase::new("d", "fourth").input("four\n").expected_output("four"),
        ];
        let results = r.run_all(&cases).await;
        let ids: Vec<_> = results.iter().map(|r| r.test_case_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
        let passed: Vec<_> = results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, [true, false, false, true]);
        assert!(results[1]
            .message
            .as_deref()
            .unwrap()
            .starts_with("Time limit exceeded"));
    }
}
