//! x13-wheels - build and locate x13binary wheels

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use x13_cli::cmd;
use x13_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the checksum lines
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            release,
            base_url,
            outdir,
            project_root,
            platforms,
        } => {
            cmd::build::build(&release, base_url, outdir, project_root, platforms).await
        }
        Commands::Locate => cmd::locate::locate(),
        Commands::Run { args } => cmd::run::run(&args),
        Commands::Hash { files } => cmd::hash::hash(&files),
    }
}
