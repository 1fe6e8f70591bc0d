mod cli;
mod config;
mod deepseek;
mod render;
mod shamela;

pub const USER_AGENT: &str = concat!("shamela-fusion/", env!("CARGO_PKG_VERSION"));

use clap::Parser;
use cli::{Cli, Shell};
use config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shamela_fusion=info".parse()?),
        )
        .init();

    let args = Cli::parse();
    let config = Config::from_env()?;
    info!(search_url = %config.search_url, "starting shamela-fusion");

    let shell = Shell::new(&config)?;
    let output = shell
        .run(args.command)
        .await
        .inspect_err(|e| tracing::error!("{e}"))?;

    println!("{output}");
    Ok(())
}
