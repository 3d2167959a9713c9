//! Command-line entry point for zipls.
//!
//! Prints the entry names of the target archive, or lists the fallback
//! directory when the archive is missing. Any other failure ends the
//! process with a non-zero exit code and the error chain on stderr.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zipls::{ArchiveLister, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let lister = ArchiveLister::new(cli.file, cli.fallback_dir);
    let mut stdout = std::io::stdout().lock();
    let listing = lister.list_contents(&mut stdout).await?;
    tracing::debug!(?listing, "done");

    Ok(())
}

/// Diagnostics go to stderr so stdout carries only the listing.
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
