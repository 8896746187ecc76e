use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::{CsvLayout, OutputMode};
use crate::record::IntervalRecord;

/// A trait for reporting translated records.
pub trait Report {
    type Error;

    /// Report an [`IntervalRecord`].
    fn report(&mut self, record: &IntervalRecord) -> Result<(), Self::Error>;
}

/// A [`Report`] implementation writing one CSV line per record.
pub struct CsvFileReporter<W>
where
    W: Write,
{
    writer: W,
    layout: CsvLayout,
}

impl<W> CsvFileReporter<W>
where
    W: Write,
{
    /// Creates a new [`CsvFileReporter`] with the specified [`Write`]r.
    pub fn new(writer: W, layout: CsvLayout) -> Self {
        Self { writer, layout }
    }

    /// Flushes buffered lines and gives the writer back.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl CsvFileReporter<BufWriter<File>> {
    /// Creates a new [`CsvFileReporter`] on the file at `path`, created if missing.
    ///
    /// [`OutputMode::Append`] keeps the current content, [`OutputMode::Truncate`] empties it.
    pub fn open<P>(path: P, layout: CsvLayout, mode: OutputMode) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let mut options = std::fs::OpenOptions::new();
        options.create(true);
        match mode {
            OutputMode::Append => options.append(true),
            OutputMode::Truncate => options.write(true).truncate(true),
        };
        let file = options.open(path)?;
        Ok(Self::new(BufWriter::new(file), layout))
    }
}

impl<W> Report for CsvFileReporter<W>
where
    W: Write,
{
    type Error = io::Error;

    fn report(&mut self, record: &IntervalRecord) -> Result<(), Self::Error> {
        let line = record.to_csv(&self.layout);
        trace!("Writing record: {line}");
        writeln!(self.writer, "{line}")
    }
}

/// Writes all `records` to the CSV file at `path` and returns how many were written.
///
/// The file is closed before returning, whether writing succeeded or not.
pub fn write_all<P, I>(
    path: P,
    layout: CsvLayout,
    mode: OutputMode,
    records: I,
) -> io::Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = IntervalRecord>,
{
    let mut reporter = CsvFileReporter::open(path, layout, mode)?;
    let mut written = 0;
    for record in records {
        reporter.report(&record)?;
        written += 1;
    }
    reporter.finish()?;
    Ok(written)
}
