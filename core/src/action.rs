pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::{Color, Colorize};
use crossterm::terminal;
use error::*;
use fsutil::WriteOutcome;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::evaluation::{EvaluationResult, Evaluator, Submission};
use crate::problem::{Problem, ProblemId};
use crate::style;
use crate::testing::TestResult;

/// Writes the example `assay.toml` into `dir`. Refuses to overwrite.
pub fn init_config(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(Config::FILENAME);
    let toml = Config::example_toml()?;
    match fsutil::write_with_mkdir_opt(&path, toml, false)
        .context("Failed to write the example config")?
    {
        WriteOutcome::Written => Ok(path),
        WriteOutcome::SkippedExisting => bail!("{} already exists", path.to_string_lossy()),
    }
}

/// Writes the problem's starter files into `dir`.
pub fn scaffold(
    problem: &Problem,
    dir: impl AsRef<Path>,
    overwrite: bool,
) -> Result<Vec<(PathBuf, WriteOutcome)>> {
    ensure!(
        !problem.solution_template.is_empty(),
        "Problem {} has no solution template",
        problem.id
    );
    problem
        .solution_template
        .iter()
        .map(|(filename, text)| {
            let path = dir.as_ref().join(filename);
            let outcome = fsutil::write_with_mkdir_opt(&path, text, overwrite)
                .with_context(|| format!("Failed to scaffold {}", filename))?;
            Ok((path, outcome))
        })
        .collect()
}

pub fn load_submission(program_file: impl AsRef<Path>, problem_id: ProblemId) -> Result<Submission> {
    let path = program_file.as_ref();
    let code = fsutil::read_to_string(path).context("Failed to read the program file")?;
    let mut sub = Submission::new(code, problem_id);
    sub.filename = path.file_name().map(|s| s.to_string_lossy().into_owned());
    Ok(sub)
}

pub async fn evaluate_with_spinner(
    evaluator: &Evaluator,
    submission: &Submission,
    problem: &Problem,
) -> EvaluationResult {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(format!("Evaluating against '{}' ...", problem.title));
    bar.enable_steady_tick(Duration::from_millis(80));

    let res = evaluator.evaluate(submission, problem).await;

    bar.finish_and_clear();
    res
}

pub fn print_evaluation_report(res: &EvaluationResult) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols as usize;

    let status = if res.compilation_successful {
        "Compiled".green().bold()
    } else {
        "Compilation failed".bright_red().bold()
    };
    println!("{}", status);

    if let Some(out) = res.compilation_output.as_deref() {
        if !res.compilation_successful || out != crate::testing::CompilationResult::SUCCESS_MARKER {
            print_sub_title("[compiler]", cols);
            println!("{}", out.trim_end());
        }
    }

    if let Some(results) = &res.test_results {
        println!();
        for r in results {
            print_test_result_line(r);
        }
        results
            .iter()
            .filter(|r| !r.passed)
            .for_each(|r| print_test_result_detail(r, cols));
        print_test_result_summary(results);
    }

    if let Some(feedback) = &res.quality_feedback {
        println!();
        print_sub_title("[feedback]", cols);
        for f in feedback {
            println!(
                "{} {} {}",
                style::severity_icon(f.severity),
                f.message.bold(),
                format!("({})", f.category).dimmed()
            );
            if let Some(details) = &f.details {
                println!("       {}", details.bright_black());
            }
        }
    }

    if let Some(m) = &res.performance_metrics {
        println!();
        print_sub_title("[metrics]", cols);
        for (name, score) in m.as_array() {
            println!("{:<16} {} {:>2}/10", name, style::score_bar(score), score);
        }
    }
}

fn print_test_result_line(r: &TestResult) {
    let time = r
        .execution_time
        .map(|d| format!(" [{}ms]", d.as_millis()))
        .unwrap_or_default();
    println!(
        "{}",
        format!("Testcase {} ... {}{}", r.name, style::verdict_icon(r.passed), time).cyan()
    );
}

fn print_test_result_detail(r: &TestResult, cols: usize) {
    const BOLD_LINE: &str = "━";
    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    println!(
        "\n{}: {}\n{}",
        r.name.color(Color::BrightYellow).bold(),
        style::verdict_icon(r.passed),
        bold_bar,
    );
    match r.message.as_deref() {
        Some(msg) if !msg.is_empty() => println!("{}", msg.trim_end()),
        _ => println!("{}", "<EMPTY>".magenta().dimmed()),
    }
    println!("{}", bold_bar);
}

fn print_test_result_summary(results: &[TestResult]) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let num_total_test = results.len();
    let num_passed = results.iter().filter(|r| r.passed).count();
    let num_failed = num_total_test - num_passed;

    if num_passed == num_total_test {
        let msg = format!("All {} tests passed ✨", num_total_test);
        print!("{}", msg.green());
    } else if num_passed > 0 {
        let msg = format!("{}/{} tests failed 💣", num_failed, num_total_test);
        print!("{}", msg.bright_red());
    } else {
        let msg = format!("All {} tests failed 💀", num_total_test);
        print!("{}", msg.bright_red());
    }

    println!(" {}", bar);
}

fn print_sub_title(s: &str, cols: usize) {
    const THIN_LINE: &str = "─";
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.len() + 1))
            .bright_black(),
    )
}

pub fn print_problem_list(problems: &[Problem]) {
    for p in problems {
        println!(
            "{:>3}  {}  {} {}",
            p.id.to_string().bold(),
            p.title.color(Color::BrightYellow),
            format!("[{}]", p.difficulty).cyan(),
            p.category.dimmed()
        );
    }
}

pub fn print_problem_detail(problem: &Problem) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols as usize;

    println!(
        "{} {}  {} {}",
        format!("#{}", problem.id).bold(),
        problem.title.color(Color::BrightYellow).bold(),
        format!("[{} / level {}]", problem.difficulty, problem.complexity_level).cyan(),
        problem.category.dimmed(),
    );
    println!("\n{}\n", problem.description);

    print_sub_title("[testcases]", cols);
    for t in problem.test_cases.iter().filter(|t| t.visible) {
        println!("{} {}", "•".cyan(), t.name.bold());
        if !t.description.is_empty() {
            println!("  {}", t.description.dimmed());
        }
        if let Some(expected) = t.expected() {
            println!("  {} {}", "expected:".bright_black(), expected);
        }
    }

    print_sub_title("[files]", cols);
    for name in problem.solution_template.keys() {
        println!("{}", name);
    }
}
