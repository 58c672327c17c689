use std::path::PathBuf;

use anyhow::Context as _;
use assay_core::{action, print_success, BuiltinCatalog, ProblemCatalog as _};
use colored::Colorize as _;
use fsutil::WriteOutcome;

use crate::util;

use super::{GlobalArgs, SubcmdResult};

/// Write a problem's starter files
#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub id: i64,

    #[arg(default_value = "./")]
    pub dir: PathBuf,

    /// Overwrite files that already exist
    #[arg(short, long)]
    pub force: bool,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let problem = BuiltinCatalog::load()?
        .get(args.id)
        .await?
        .with_context(|| format!("No such problem: {}", args.id))?;

    for (path, outcome) in action::scaffold(&problem, &args.dir, args.force)? {
        let path = util::replace_homedir_to_tilde(path);
        match outcome {
            WriteOutcome::Written => println!("{} {}", "created".green(), path.to_string_lossy()),
            WriteOutcome::SkippedExisting => println!(
                "{} {} (use --force to overwrite)",
                "skipped".yellow(),
                path.to_string_lossy()
            ),
        }
    }
    print_success!("Scaffolded '{}'", problem.title);
    Ok(())
}
