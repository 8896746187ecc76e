use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::classifier::{FileClassifier, LogFile};
use crate::config::{LinePolicy, OutputMode, ScrubberConfig};
use crate::error::ScrubError;
use crate::record::IntervalRecord;
use crate::report;
use crate::role::{Role, Side};
use crate::timestamp;
use crate::translator::LineTranslator;

/// Outcome of a [`Scrubber::run`].
#[derive(Debug, Default)]
pub struct RunReport {
    /// Log files translated and written.
    pub files_processed: usize,
    pub records_written: usize,
    /// Log files that could not be translated, with the reason.
    pub failures: Vec<(PathBuf, ScrubError)>,
}

/// Turns a directory of iperf logs into one CSV file per run and role.
pub struct Scrubber {
    config: ScrubberConfig,
    classifier: FileClassifier,
}

impl Scrubber {
    pub fn new(config: ScrubberConfig) -> Self {
        let classifier = FileClassifier::from_config(&config);
        Self { config, classifier }
    }

    /// Scrubs every configured role of `dir`, see [`Scrubber::run_roles`].
    pub fn run<P>(&self, dir: P) -> Result<RunReport, ScrubError>
    where
        P: AsRef<Path>,
    {
        let roles = self.config.roles();
        self.run_roles(dir, &roles)
    }

    /// Scrubs the logs of each role in turn, lowest load first.
    ///
    /// A file that fails is recorded in the [`RunReport`] and the run goes on with the next
    /// one. Only a missing directory, an unwritable output directory or the absence of any
    /// matching log abort the run.
    pub fn run_roles<P>(&self, dir: P, roles: &[Role]) -> Result<RunReport, ScrubError>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        let output_dir = match &self.config.output_dir {
            Some(output_dir) => {
                std::fs::create_dir_all(output_dir)
                    .map_err(|e| ScrubError::not_found(output_dir, e))?;
                output_dir.as_path()
            }
            None => dir,
        };

        let mut report = RunReport::default();
        let mut truncated = HashSet::new();
        let mut matched = 0;
        for &role in roles {
            let role_token = self.classifier.role_tokens().token(role);
            let files = self.classifier.classify(dir, role)?;
            info!(
                "Found {} '{role_token}' log files in {}",
                files.len(),
                dir.display()
            );
            matched += files.len();

            for file in &files {
                match self.scrub_file(file, output_dir, &mut truncated) {
                    Ok(written) => {
                        report.files_processed += 1;
                        report.records_written += written;
                    }
                    Err(e) => {
                        error!("Failed to scrub {}: {e}", file.path.display());
                        report.failures.push((file.path.clone(), e));
                    }
                }
            }
        }

        if matched == 0 {
            return Err(ScrubError::NoInputFiles(dir.to_path_buf()));
        }
        info!(
            "Wrote {} records from {} log files, {} failed",
            report.records_written,
            report.files_processed,
            report.failures.len()
        );

        Ok(report)
    }

    /// CSV file collecting the records of the run and role of `file`.
    pub fn csv_path(&self, file: &LogFile, output_dir: &Path) -> PathBuf {
        output_dir.join(format!(
            "{}-{}.csv",
            file.run_id,
            self.classifier.role_tokens().token(file.role)
        ))
    }

    fn scrub_file(
        &self,
        file: &LogFile,
        output_dir: &Path,
        truncated: &mut HashSet<PathBuf>,
    ) -> Result<usize, ScrubError> {
        // only sender logs carry the start time
        let start_path = match file.role.side {
            Side::Sender => file.path.clone(),
            Side::Receiver => timestamp::paired_sender_path(&self.classifier, &file.path)?,
        };
        let start_time = timestamp::resolve(&start_path)?;
        debug!(
            "Start time of {} is {start_time}, read from {}",
            file.path.display(),
            start_path.display()
        );

        let load_label = self
            .config
            .layout
            .include_load_label
            .then(|| file.load_level.to_string());
        let translation = LineTranslator::new(start_time, load_label)
            .summary_marker(self.config.summary_marker.clone())
            .translate(&file.path)?;
        let records = self.collect_records(&file.path, translation)?;

        let csv_path = self.csv_path(file, output_dir);
        let mode = match self.config.output_mode {
            OutputMode::Truncate if truncated.insert(csv_path.clone()) => OutputMode::Truncate,
            _ => OutputMode::Append,
        };
        debug!(
            "Writing {} records to {} ({mode:?})",
            records.len(),
            csv_path.display()
        );

        Ok(report::write_all(&csv_path, self.config.layout, mode, records)?)
    }

    /// Applies the configured [`LinePolicy`] to the translation of `path`.
    fn collect_records<I>(
        &self,
        path: &Path,
        translation: I,
    ) -> Result<Vec<IntervalRecord>, ScrubError>
    where
        I: IntoIterator<Item = Result<IntervalRecord, ScrubError>>,
    {
        let mut records = Vec::new();
        for item in translation {
            match item {
                Ok(record) => records.push(record),
                Err(ScrubError::Line { line, source })
                    if self.config.line_policy == LinePolicy::Skip =>
                {
                    warn!("Skipping line {line} of {}: {source}", path.display());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}
