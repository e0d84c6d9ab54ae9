use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use testdata_loader::{
    config::{Args, LoaderConfig},
    loader,
};

/// Filter used when `RUST_LOG` is not set.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug,sqlx=warn"
    } else {
        "info,sqlx=warn"
    }
}

fn init_logger(verbose: bool) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter(verbose))).init();
}

fn run(args: Args) -> Result<()> {
    let config = LoaderConfig::from_env(args)?;

    let execution = loader::run(&config)
        .with_context(|| format!("loading {} records into {}", config.records, config.table))?;

    info!(
        "Loaded {} records into {} in {} transactions",
        execution.write_count, config.table, execution.commit_count
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
