use anyhow::Result;
use clap::Parser;

use interactgen::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    cli::init_logging(&config);

    cli::run(cli, config).await
}
