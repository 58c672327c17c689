use assay_cli::{cmd::GlobalArgs, util};
use clap::Parser;

#[tokio::main]
async fn main() {
    let app = GlobalArgs::parse();
    util::init_logger();
    app.exec_subcmd().await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });
}
