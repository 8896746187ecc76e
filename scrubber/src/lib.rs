//! Translates the interval reports of iperf2 UDP logs into timestamped CSV records.
//!
//! A trial writes one log per role and offered load, named `<run>-<load>-<role>.<ext>`
//! (`run1-150M-sender.log`). Only sender logs start with the trial start time, receiver logs
//! borrow it from the sender log of the same run, load and stream. The records of all loads
//! of one run and role end up in `<run>-<role>.csv`, lowest load first.

#[macro_use]
extern crate log;

mod classifier;
mod config;
mod error;
mod orchestrator;
mod record;
mod report;
mod role;
mod timestamp;
mod translator;

pub use self::classifier::{parse_load_level, FileClassifier, LogFile};
pub use self::config::{
    CsvLayout, LinePolicy, OutputMode, ScrubberConfig, DEFAULT_EXTENSION, DEFAULT_SUMMARY_MARKER,
};
pub use self::error::{FormatError, ScrubError};
pub use self::orchestrator::{RunReport, Scrubber};
pub use self::record::{IntervalRecord, Latency, RECORD_TIME_FORMAT};
pub use self::report::{write_all, CsvFileReporter, Report};
pub use self::role::{Role, RoleToken, RoleTokens, Side};
pub use self::timestamp::{paired_sender_path, parse_start_time, resolve, START_TIME_FORMAT};
pub use self::translator::{rejoin_latency, LineTranslator, Translation, MIN_DATA_TOKENS};
