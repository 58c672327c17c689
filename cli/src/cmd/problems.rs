use anyhow::Context as _;
use assay_core::{action, problem::Problem, BuiltinCatalog, ProblemCatalog as _};
use assay_webclient::EvalClient;

use super::{GlobalArgs, SubcmdResult};

/// List problems, or show one in detail
#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub id: Option<i64>,

    /// Ask a running server instead of the built-in catalog
    #[arg(short, long)]
    pub server: Option<String>,

    #[arg(long)]
    pub json: bool,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    match args.id {
        None => {
            let problems = match &args.server {
                Some(url) => EvalClient::new(url)?.list_problems().await?,
                None => BuiltinCatalog::load()?.list().await?,
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&problems)?);
            } else {
                action::print_problem_list(&problems);
            }
        }
        Some(id) => {
            let problem: Problem = match &args.server {
                Some(url) => EvalClient::new(url)?.get_problem(id).await?,
                None => BuiltinCatalog::load()?.get(id).await?,
            }
            .with_context(|| format!("No such problem: {}", id))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&problem)?);
            } else {
                action::print_problem_detail(&problem);
            }
        }
    }
    Ok(())
}
