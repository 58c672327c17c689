use std::path::PathBuf;

use anyhow::Context as _;
use assay_core::{action, BuiltinCatalog, Evaluator, ProblemCatalog as _};

use super::{GlobalArgs, SubcmdResult};

/// Compile, test and review a program locally
#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub program_file: PathBuf,

    #[arg(short, long)]
    pub problem: i64,

    /// Print the raw result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = global_args.load_config()?;
    let catalog = BuiltinCatalog::load()?;
    let problem = catalog
        .get(args.problem)
        .await?
        .with_context(|| format!("No such problem: {}", args.problem))?;

    let submission = action::load_submission(&args.program_file, args.problem)?;
    let evaluator = Evaluator::new(cfg)?;

    if args.json {
        let res = evaluator.evaluate(&submission, &problem).await;
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        let res = action::evaluate_with_spinner(&evaluator, &submission, &problem).await;
        action::print_evaluation_report(&res);
    }
    Ok(())
}
