use anyhow::Result;
use clap::Parser;
use malote::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    malote::logging::init(cli.verbose);
    cli.run().await
}
