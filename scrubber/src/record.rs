use chrono::NaiveDateTime;

use crate::config::CsvLayout;

/// Layout of the timestamp column, e.g. `02/27/2018 10:23:54`.
pub const RECORD_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// The four latency statistics of one interval, as reported by iperf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Latency {
    pub avg: String,
    pub min: String,
    pub max: String,
    pub stdev: String,
}

/// One reporting interval of an iperf UDP log.
///
/// Measured values are kept as written in the log so that the CSV reproduces them exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    /// Trial start time plus the end boundary of the interval.
    pub timestamp: NaiveDateTime,
    pub load_label: Option<String>,
    pub transfer: String,
    pub bandwidth: String,
    pub lost: u64,
    pub total: u64,
    pub latency: Latency,
    /// Packets per second, `None` when the log has no pps group.
    pub pps: Option<String>,
}

impl IntervalRecord {
    /// Renders the record as one CSV line without the trailing newline.
    pub fn to_csv(&self, layout: &CsvLayout) -> String {
        let mut line = self.timestamp.format(RECORD_TIME_FORMAT).to_string();
        if layout.include_load_label {
            line.push(',');
            line.push_str(self.load_label.as_deref().unwrap_or_default());
        }
        let Latency {
            avg,
            min,
            max,
            stdev,
        } = &self.latency;
        line.push_str(&format!(
            ",{},{},{},{},{avg},{min},{max},{stdev}",
            self.transfer, self.bandwidth, self.lost, self.total
        ));
        if layout.include_pps {
            line.push(',');
            line.push_str(self.pps.as_deref().unwrap_or_default());
        }
        line
    }
}
