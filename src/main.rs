use clap::Parser;
use mapnote::cli::{self, Cli};
use mapnote::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = cli::load_config()?;
    cli::run(cli.command, &config).await
}
