use std::io::BufRead as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::classifier::FileClassifier;
use crate::error::{FormatError, ScrubError};

/// Layout of the start time written on the first line of sender logs, e.g. `20180227_102344`.
pub const START_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Reads the trial start time from the first line of a sender log.
pub fn resolve<P>(sender_path: P) -> Result<NaiveDateTime, ScrubError>
where
    P: AsRef<Path>,
{
    let sender_path = sender_path.as_ref();
    let file =
        std::fs::File::open(sender_path).map_err(|e| ScrubError::not_found(sender_path, e))?;
    let mut first_line = String::new();
    std::io::BufReader::new(file).read_line(&mut first_line)?;
    trace!("Raw start time of {}: {first_line:?}", sender_path.display());

    Ok(parse_start_time(&first_line)?)
}

/// Parses a `YYYYMMDD_HHMMSS` start time, ignoring surrounding whitespace.
pub fn parse_start_time(line: &str) -> Result<NaiveDateTime, FormatError> {
    let raw = line.trim();
    let well_formed = raw.len() == 15
        && raw.bytes().enumerate().all(|(i, b)| match i {
            8 => b == b'_',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(FormatError::Timestamp(raw.to_string()));
    }

    NaiveDateTime::parse_from_str(raw, START_TIME_FORMAT)
        .map_err(|_| FormatError::Timestamp(raw.to_string()))
}

/// Path of the sender log paired with `path`: same directory, run, load and stream.
pub fn paired_sender_path<P>(classifier: &FileClassifier, path: P) -> Result<PathBuf, FormatError>
where
    P: AsRef<Path>,
{
    let file = classifier.parse(path.as_ref())?;
    let name = classifier.file_name(
        &file.run_id,
        &file.load_label,
        file.role.counterpart_sender(),
    );

    Ok(path.as_ref().with_file_name(name))
}
