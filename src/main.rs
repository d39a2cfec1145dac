use anyhow::Context;
use clap::Parser;
use climate_summary::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).context("climate summary failed")
}
