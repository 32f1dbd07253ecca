use anyhow::Result;
use clap::Parser;
use mc_pool::cli::Args;
use mc_pool::format_results;
use mc_pool::logging::init_logging;
use mc_pool_async::run_async;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let results = run_async(&args.to_config()).await?;
    println!("{}", format_results(&results));

    Ok(())
}
