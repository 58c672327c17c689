use std::path::PathBuf;

use anyhow::Context as _;
use assay_core::action;
use assay_webclient::EvalClient;

use super::{GlobalArgs, SubcmdResult, DEFAULT_SERVER_URL};

/// Evaluate a program on a running assay server
#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub program_file: PathBuf,

    #[arg(short, long)]
    pub problem: i64,

    #[arg(short, long, env = "ASSAY_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Print the raw result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let submission = action::load_submission(&args.program_file, args.problem)?;
    let cli = EvalClient::new(&args.server)?;

    log::info!("Submitting {} to {}", args.program_file.to_string_lossy(), args.server);
    let res = cli
        .evaluate(&submission)
        .await
        .with_context(|| format!("Failed to evaluate on {}", args.server))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        action::print_evaluation_report(&res);
    }
    Ok(())
}
