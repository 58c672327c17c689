use std::net::SocketAddr;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Overrides `[server] bind_addr`
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let mut cfg = global_args.load_config()?;
    if let Some(addr) = args.bind {
        cfg.server.bind_addr = addr;
    }
    assay_server::serve(cfg).await
}
