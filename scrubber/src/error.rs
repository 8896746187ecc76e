use std::path::PathBuf;

/// Errors raised while scrubbing a directory of iperf logs.
#[derive(Debug, thiserror::Error)]
pub enum ScrubError {
    #[error("Cannot access {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No log files matching any role were found in {}", .0.display())]
    NoInputFiles(PathBuf),
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
    #[error("Malformed line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: FormatError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrubError {
    pub(crate) fn not_found<P>(path: P, source: std::io::Error) -> Self
    where
        P: Into<PathBuf>,
    {
        ScrubError::NotFound {
            path: path.into(),
            source,
        }
    }
}

/// Content that cannot be reconciled with the expected iperf naming or report layout.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("file name '{name}' is not <run>-<load>-<role>.<ext>: {reason}")]
    FileName { name: String, reason: &'static str },
    #[error("start timestamp '{0}' is not YYYYMMDD_HHMMSS")]
    Timestamp(String),
    #[error("interval '{0}' has no numeric end boundary")]
    Interval(String),
    #[error("loss counter '{0}' is not <lost>/<total>")]
    LossCounter(String),
    #[error("latency group '{group}' split into {count} values instead of 4")]
    LatencyCount { group: String, count: usize },
    #[error("latency value '{0}' is not a number")]
    LatencyValue(String),
}
