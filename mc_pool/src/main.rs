use anyhow::Result;
use clap::Parser;
use mc_pool::cli::Args;
use mc_pool::logging::init_logging;
use mc_pool::{format_results, run};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let results = run(&args.to_config())?;
    println!("{}", format_results(&results));

    Ok(())
}
