use std::path::PathBuf;

use clap::Parser;

use iperf_scrubber::{
    LinePolicy, OutputMode, ScrubberConfig, DEFAULT_EXTENSION, DEFAULT_SUMMARY_MARKER,
};

/// Turns iperf2 UDP logs into timestamped CSV files, one per run and role.
#[derive(Parser)]
#[command(about, long_about = None)]
pub struct CliArgs {
    /// Absolute path of the directory holding the `<run>-<load>-<role>.<ext>` logs.
    #[arg(value_name = "RESULT_FILE_DIRECTORY")]
    pub log_dir: PathBuf,

    /// Number of parallel streams per trial. More than one expects numbered roles such as `sender1`.
    #[arg(long, default_value_t = 1)]
    pub streams: u32,

    /// Add the offered load column after the timestamp.
    #[arg(long, default_value = "false")]
    pub load_label: bool,

    /// Leave out the packets-per-second column.
    #[arg(long, default_value = "false")]
    pub no_pps: bool,

    /// Role token of the logs of the traffic generating side.
    #[arg(long, default_value = "sender")]
    pub sender_token: String,

    /// Role token of the logs of the receiving side.
    #[arg(long, default_value = "receiver")]
    pub receiver_token: String,

    /// Extension of the log files.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Intervals containing this text are cumulative summaries of the whole run and are skipped.
    #[arg(long, default_value = DEFAULT_SUMMARY_MARKER)]
    pub summary_marker: String,

    /// Empty each CSV file before writing to it, instead of appending to what previous runs wrote.
    #[arg(long, default_value = "false")]
    pub truncate: bool,

    /// Give up on a log at its first malformed interval line instead of skipping the line.
    #[arg(long, default_value = "false")]
    pub strict: bool,

    /// Directory receiving the CSV files. Defaults to the log directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Exit successfully even when some logs could not be scrubbed.
    #[arg(long, env = "IGNORE_SCRUB_ERRORS", default_value = "false")]
    pub ignore_errors: bool,
}

impl CliArgs {
    /// The [`ScrubberConfig`] described by the arguments.
    pub fn config(&self) -> ScrubberConfig {
        ScrubberConfig::default()
            .role_tokens(self.sender_token.clone(), self.receiver_token.clone())
            .extension(self.extension.clone())
            .streams(self.streams)
            .include_load_label(self.load_label)
            .include_pps(!self.no_pps)
            .summary_marker(self.summary_marker.clone())
            .output_mode(if self.truncate {
                OutputMode::Truncate
            } else {
                OutputMode::Append
            })
            .line_policy(if self.strict {
                LinePolicy::Strict
            } else {
                LinePolicy::Skip
            })
            .output_dir(self.output_dir.clone())
    }
}
