#[macro_use]
extern crate log;

use anyhow::Context as _;
use clap::Parser as _;
use iperf_scrubber::Scrubber;

mod cli;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    env_logger::try_init()?;

    let args = cli::CliArgs::try_parse()?;
    info!("{CRATE_NAME} {CRATE_VERSION}");
    info!("Start cleaning result files in: {}", args.log_dir.display());

    let config = args.config();
    debug!("Using configuration: {config:?}");

    let report = Scrubber::new(config)
        .run(&args.log_dir)
        .with_context(|| format!("Failed to scrub {}", args.log_dir.display()))?;

    if !report.failures.is_empty() {
        let error_message = format!(
            "{} out of {} log files failed:\n{}",
            report.failures.len(),
            report.failures.len() + report.files_processed,
            report
                .failures
                .iter()
                .map(|(path, e)| format!("  {}: {e}", path.display()))
                .collect::<Vec<_>>()
                .join("\n")
        );

        if args.ignore_errors {
            warn!("{error_message}");
        } else {
            return Err(anyhow::anyhow!(error_message));
        }
    }

    info!(
        "Scrubbed {} log files into {} records",
        report.files_processed, report.records_written
    );

    Ok(())
}
