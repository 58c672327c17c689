pub mod evaluate;
pub mod init;
pub mod problems;
pub mod scaffold;
pub mod serve;
pub mod submit;

use std::path::PathBuf;

use assay_core::Config;

use crate::util;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Config file to use instead of searching for assay.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Serve(serve::Args),

    #[command(alias("e"))]
    Evaluate(evaluate::Args),

    #[command(alias("s"))]
    Submit(submit::Args),

    Problems(problems::Args),
    Scaffold(scaffold::Args),
    Init(init::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Serve(args) => serve::exec(args, self).await,
            Evaluate(args) => evaluate::exec(args, self).await,
            Submit(args) => submit::exec(args, self).await,
            Problems(args) => problems::exec(args, self).await,
            Scaffold(args) => scaffold::exec(args, self).await,
            Init(args) => init::exec(args, self),
        }
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        let cfg = Config::load(self.config.as_deref(), util::current_dir())?;
        if let Some(path) = &cfg.source_config_file {
            log::debug!(
                "Using {}",
                util::replace_homedir_to_tilde(path).to_string_lossy()
            );
        }
        Ok(cfg)
    }
}

/// Default base URL for commands that talk to a running server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
