use std::path::PathBuf;

use crate::role::{Role, RoleTokens};

/// Substring of the interval token that marks the cumulative summary of a whole run.
pub const DEFAULT_SUMMARY_MARKER: &str = "360";
/// Extension of the iperf logs.
pub const DEFAULT_EXTENSION: &str = "log";

/// How a CSV file is opened the first time it is written during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Keep existing content, reruns append duplicate records.
    #[default]
    Append,
    /// Empty the file before the first write of the run.
    Truncate,
}

/// What happens to a data line that cannot be translated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinePolicy {
    /// Log the line and continue with the next one.
    #[default]
    Skip,
    /// Abort the whole file before any of its records are written.
    Strict,
}

/// Columns present in the CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    pub include_load_label: bool,
    pub include_pps: bool,
}

impl Default for CsvLayout {
    fn default() -> Self {
        CsvLayout {
            include_load_label: false,
            include_pps: true,
        }
    }
}

/// Configuration of a scrub run.
///
/// Built from [`Default`] with the consuming setters below.
#[derive(Debug, Clone)]
pub struct ScrubberConfig {
    pub role_tokens: RoleTokens,
    pub extension: String,
    pub streams: u32,
    pub layout: CsvLayout,
    pub summary_marker: String,
    pub output_mode: OutputMode,
    pub line_policy: LinePolicy,
    pub output_dir: Option<PathBuf>,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        ScrubberConfig {
            role_tokens: RoleTokens::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            streams: 1,
            layout: CsvLayout::default(),
            summary_marker: DEFAULT_SUMMARY_MARKER.to_string(),
            output_mode: OutputMode::default(),
            line_policy: LinePolicy::default(),
            output_dir: None,
        }
    }
}

impl ScrubberConfig {
    /// Builds a [`ScrubberConfig`] with the specified role tokens.
    pub fn role_tokens(mut self, sender: String, receiver: String) -> Self {
        self.role_tokens = RoleTokens { sender, receiver };
        self
    }

    /// Builds a [`ScrubberConfig`] with the specified log file extension, without the dot.
    pub fn extension(mut self, extension: String) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Builds a [`ScrubberConfig`] for trials with the specified number of parallel streams.
    pub fn streams(mut self, streams: u32) -> Self {
        self.streams = streams;
        self
    }

    /// Builds a [`ScrubberConfig`] with or without the load label column.
    pub fn include_load_label(mut self, include: bool) -> Self {
        self.layout.include_load_label = include;
        self
    }

    /// Builds a [`ScrubberConfig`] with or without the packets-per-second column.
    pub fn include_pps(mut self, include: bool) -> Self {
        self.layout.include_pps = include;
        self
    }

    /// Builds a [`ScrubberConfig`] with the specified cumulative summary marker.
    pub fn summary_marker(mut self, marker: String) -> Self {
        self.summary_marker = marker;
        self
    }

    /// Builds a [`ScrubberConfig`] with the specified [`OutputMode`].
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Builds a [`ScrubberConfig`] with the specified [`LinePolicy`].
    pub fn line_policy(mut self, policy: LinePolicy) -> Self {
        self.line_policy = policy;
        self
    }

    /// Builds a [`ScrubberConfig`] writing CSV files to the specified directory.
    pub fn output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    /// The roles processed by a run, senders first.
    pub fn roles(&self) -> Vec<Role> {
        Role::enumerate(self.streams)
    }
}
