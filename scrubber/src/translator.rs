use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};

use crate::config::DEFAULT_SUMMARY_MARKER;
use crate::error::{FormatError, ScrubError};
use crate::record::{IntervalRecord, Latency};

/// Lines with at most this many tokens are headers, connection notes or blank.
pub const MIN_DATA_TOKENS: usize = 15;

const INTERVAL: usize = 2;
const TRANSFER: usize = 4;
const BANDWIDTH: usize = 6;
const LOSS: usize = 10;
/// First token after the loss counter and its `(0.027%)` percentage.
const LATENCY_START: usize = 12;
const PPS_UNIT: &str = "pps";

/// Translates the interval lines of one iperf UDP log into [`IntervalRecord`]s.
///
/// A data line looks like
///
/// ```text
/// [  3] 20.00-30.00 sec  187 MBytes  157 Mbits/sec  0.009 ms  0/1535998 (0%)  0.068/ 0.040/ 0.990/ 0.041 ms 153601 pps
/// ```
#[derive(Debug, Clone)]
pub struct LineTranslator {
    start_time: NaiveDateTime,
    load_label: Option<String>,
    summary_marker: String,
}

impl LineTranslator {
    pub fn new(start_time: NaiveDateTime, load_label: Option<String>) -> Self {
        Self {
            start_time,
            load_label,
            summary_marker: DEFAULT_SUMMARY_MARKER.to_string(),
        }
    }

    /// Builds a [`LineTranslator`] skipping intervals whose range contains `marker`.
    pub fn summary_marker(mut self, marker: String) -> Self {
        self.summary_marker = marker;
        self
    }

    /// Opens the log at `path` and lazily translates it line by line.
    pub fn translate<P>(self, path: P) -> Result<Translation<BufReader<std::fs::File>>, ScrubError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| ScrubError::not_found(path, e))?;
        Ok(self.translate_reader(file))
    }

    /// Lazily translates the lines of `reader`.
    pub fn translate_reader<R>(self, reader: R) -> Translation<BufReader<R>>
    where
        R: Read,
    {
        Translation {
            reader: BufReader::new(reader),
            buffer: Vec::new(),
            line_number: 0,
            translator: self,
        }
    }

    /// Translates a single line.
    ///
    /// Non-data lines and the cumulative summary line give `Ok(None)`.
    pub fn translate_line(&self, line: &str) -> Result<Option<IntervalRecord>, FormatError> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        if tokens.len() <= MIN_DATA_TOKENS {
            return Ok(None);
        }
        let interval = tokens[INTERVAL];
        if !self.summary_marker.is_empty() && interval.contains(self.summary_marker.as_str()) {
            trace!("Skipping cumulative summary {interval}");
            return Ok(None);
        }
        trace!("Parsed line fields - {tokens:?}");

        let elapsed = parse_elapsed(interval)?;
        let timestamp = TimeDelta::try_seconds(elapsed)
            .and_then(|delta| self.start_time.checked_add_signed(delta))
            .ok_or_else(|| FormatError::Interval(interval.to_string()))?;
        let (lost, total) = parse_loss(tokens[LOSS])?;

        // pps is addressed from the end since the latency group has no fixed token count
        let has_pps = tokens.last() == Some(&PPS_UNIT);
        let latency_end = if has_pps {
            tokens.len() - 3
        } else {
            tokens.len() - 1
        };
        let latency = rejoin_latency(&tokens[LATENCY_START..latency_end])?;
        let pps = has_pps.then(|| tokens[tokens.len() - 2].to_string());

        Ok(Some(IntervalRecord {
            timestamp,
            load_label: self.load_label.clone(),
            transfer: tokens[TRANSFER].to_string(),
            bandwidth: tokens[BANDWIDTH].to_string(),
            lost,
            total,
            latency,
            pps,
        }))
    }
}

/// Lazy sequence of the records of one log, see [`LineTranslator::translate`].
///
/// A malformed data line yields [`ScrubError::Line`] and the iteration can go on with the
/// next line, a read failure yields [`ScrubError::Io`]. Bytes that are not UTF-8 are replaced,
/// a stray byte in a banner line does not hide the intervals around it.
pub struct Translation<B> {
    reader: B,
    buffer: Vec<u8>,
    line_number: usize,
    translator: LineTranslator,
}

impl<B> Iterator for Translation<B>
where
    B: BufRead,
{
    type Item = Result<IntervalRecord, ScrubError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_number += 1;
            let line = String::from_utf8_lossy(&self.buffer);
            match self.translator.translate_line(&line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(source) => {
                    return Some(Err(ScrubError::Line {
                        line: self.line_number,
                        source,
                    }));
                }
            }
        }
    }
}

/// Whole seconds from the trial start to the end of an interval such as `20.00-30.00`.
fn parse_elapsed(interval: &str) -> Result<i64, FormatError> {
    interval
        .rsplit('-')
        .next()
        .and_then(|end| end.parse::<f64>().ok())
        .filter(|end| end.is_finite())
        .map(|end| end.trunc() as i64)
        .ok_or_else(|| FormatError::Interval(interval.to_string()))
}

/// Splits a `lost/total` counter.
fn parse_loss(token: &str) -> Result<(u64, u64), FormatError> {
    let malformed = || FormatError::LossCounter(token.to_string());
    let (lost, total) = token.split_once('/').ok_or_else(malformed)?;
    let lost = lost.parse().map_err(|_| malformed())?;
    let total = total.parse().map_err(|_| malformed())?;
    Ok((lost, total))
}

/// Recovers `avg/min/max/stdev` from the tokens spanning the latency group.
///
/// Whitespace inside the group depends on the sign and width of each value, so a negative
/// minimum can end up in the same token as the average (`0.002/-0.030/`). The `/` separators
/// are always there, so the tokens are joined back together and split on them.
pub fn rejoin_latency(tokens: &[&str]) -> Result<Latency, FormatError> {
    let group = tokens.concat();
    let values = group.split('/').collect::<Vec<_>>();
    let [avg, min, max, stdev] = values.as_slice() else {
        return Err(FormatError::LatencyCount {
            count: values.len(),
            group,
        });
    };
    for value in [avg, min, max, stdev] {
        if value.parse::<f64>().is_err() {
            return Err(FormatError::LatencyValue(value.to_string()));
        }
    }

    Ok(Latency {
        avg: avg.to_string(),
        min: min.to_string(),
        max: max.to_string(),
        stdev: stdev.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const NORMAL_LINE: &str = "[  3] 20.00-30.00 sec  187 MBytes   157 Mbits/sec   0.009 ms    0/1535998 (0%)  0.068/ 0.040/ 0.990/ 0.041 ms 153601 pps";
    const MERGED_MIN_LINE: &str = "[  3] 0.00-10.00 sec  187 MBytes   157 Mbits/sec   0.005 ms  414/1536026 (0.027%)  0.002/-0.030/ 2.248/ 0.059 ms 153561 pps";
    const MERGED_MAX_LINE: &str = "[  3] 40.00-50.00 sec  187 MBytes   157 Mbits/sec   0.011 ms    3/1535994 (0.0002%)  0.072/ 0.000/10.274/ 0.324 ms 153599 pps";

    fn start_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 2, 27)
            .unwrap()
            .and_hms_opt(10, 23, 44)
            .unwrap()
    }

    fn translator() -> LineTranslator {
        LineTranslator::new(start_time(), None)
    }

    fn latency(avg: &str, min: &str, max: &str, stdev: &str) -> Latency {
        Latency {
            avg: avg.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            stdev: stdev.to_string(),
        }
    }

    #[test]
    fn test_should_translate_normal_line() {
        let record = translator()
            .translate_line(NORMAL_LINE)
            .unwrap()
            .expect("Line should produce a record");

        assert_eq!(
            record,
            IntervalRecord {
                timestamp: start_time() + TimeDelta::seconds(30),
                load_label: None,
                transfer: "187".to_string(),
                bandwidth: "157".to_string(),
                lost: 0,
                total: 1535998,
                latency: latency("0.068", "0.040", "0.990", "0.041"),
                pps: Some("153601".to_string()),
            }
        );
    }

    #[test]
    fn test_should_translate_line_with_merged_min() {
        let record = translator()
            .translate_line(MERGED_MIN_LINE)
            .unwrap()
            .unwrap();

        assert_eq!(record.timestamp, start_time() + TimeDelta::seconds(10));
        assert_eq!(record.lost, 414);
        assert_eq!(record.total, 1536026);
        assert_eq!(record.latency, latency("0.002", "-0.030", "2.248", "0.059"));
        assert_eq!(record.pps.as_deref(), Some("153561"));
    }

    #[test]
    fn test_should_translate_line_with_merged_max() {
        let record = translator()
            .translate_line(MERGED_MAX_LINE)
            .unwrap()
            .unwrap();

        assert_eq!(record.latency, latency("0.072", "0.000", "10.274", "0.324"));
        assert_eq!(record.pps.as_deref(), Some("153599"));
    }

    #[test]
    fn test_should_carry_load_label() {
        let record = LineTranslator::new(start_time(), Some("150".to_string()))
            .translate_line(NORMAL_LINE)
            .unwrap()
            .unwrap();
        assert_eq!(record.load_label.as_deref(), Some("150"));
    }

    #[test]
    fn test_should_truncate_fractional_end_boundary() {
        let line = NORMAL_LINE.replace("20.00-30.00", "29.50-30.99");
        let record = translator().translate_line(&line).unwrap().unwrap();
        assert_eq!(record.timestamp, start_time() + TimeDelta::seconds(30));
    }

    #[test]
    fn test_should_translate_line_without_pps_group() {
        let line = "[  3] 20.00-30.00 sec  187 MBytes   157 Mbits/sec   0.009 ms    0/1535998 (0%)  0.068/ 0.040/ 0.990/ 0.041 ms";
        let record = translator().translate_line(line).unwrap().unwrap();
        assert_eq!(record.latency, latency("0.068", "0.040", "0.990", "0.041"));
        assert_eq!(record.pps, None);
    }

    #[test]
    fn test_should_skip_short_lines() {
        for line in [
            "",
            "------------------------------------------------------------",
            "[ ID] Interval        Transfer     Bandwidth        Jitter   Lost/Total  Latency avg/min/max/stdev PPS",
            "[  3] local 10.0.0.2 port 5001 connected with 10.0.0.1 port 40312",
            // exactly 15 tokens
            "[  3] 20.00-30.00 sec 187 MBytes 157 Mbits/sec 0.009 ms 0/1535998 (0%) 0.068/0.040/0.990/0.041 ms 153601",
        ] {
            assert_eq!(translator().translate_line(line), Ok(None), "{line:?}");
        }
    }

    #[test]
    fn test_should_skip_cumulative_summary_line() {
        let line = NORMAL_LINE.replace("20.00-30.00", "0.00-360.00");
        assert_eq!(translator().translate_line(&line), Ok(None));
    }

    #[test]
    fn test_should_honour_custom_summary_marker() {
        let translator = translator().summary_marker("30.00".to_string());
        assert_eq!(translator.translate_line(NORMAL_LINE), Ok(None));

        let line = NORMAL_LINE.replace("20.00-30.00", "0.00-360.00");
        assert!(translator.translate_line(&line).unwrap().is_some());
    }

    #[test]
    fn test_should_reject_non_numeric_interval() {
        let line = NORMAL_LINE.replace("20.00-30.00", "20.00-end");
        assert_eq!(
            translator().translate_line(&line),
            Err(FormatError::Interval("20.00-end".to_string()))
        );
    }

    #[test]
    fn test_should_reject_malformed_loss_counter() {
        let line = NORMAL_LINE.replace("0/1535998", "0-1535998");
        assert_eq!(
            translator().translate_line(&line),
            Err(FormatError::LossCounter("0-1535998".to_string()))
        );
    }

    #[test]
    fn test_should_reject_latency_group_without_four_values() {
        let line = NORMAL_LINE.replace("0.990/ ", "");
        assert_eq!(
            translator().translate_line(&line),
            Err(FormatError::LatencyCount {
                group: "0.068/0.040/0.041".to_string(),
                count: 3
            })
        );
    }

    #[test]
    fn test_should_reject_non_numeric_latency() {
        assert_eq!(
            rejoin_latency(&["0.068/", "n/a/", "0.990"]),
            Err(FormatError::LatencyValue("n".to_string()))
        );
    }

    #[test]
    fn test_rejoin_should_not_depend_on_whitespace_merging() {
        let values = ["0.002", "-0.030", "2.248", "0.059"];
        // every subset of the three `/` boundaries may lose its trailing space
        for merged in 0..8u8 {
            let mut group = String::new();
            for (i, value) in values.iter().enumerate() {
                group.push_str(value);
                if i < 3 {
                    group.push('/');
                    if merged & (1 << i) == 0 {
                        group.push(' ');
                    }
                }
            }
            let tokens = group.split_whitespace().collect::<Vec<_>>();
            assert_eq!(
                rejoin_latency(&tokens),
                Ok(latency("0.002", "-0.030", "2.248", "0.059")),
                "{group:?}"
            );
        }
    }

    #[test]
    fn test_translation_should_yield_records_and_line_errors() {
        let log = format!(
            "20180227_102344\n[ ID] Interval Transfer Bandwidth\n{MERGED_MIN_LINE}\n{}\n{NORMAL_LINE}\n{}\n",
            NORMAL_LINE.replace("0/1535998", "lost"),
            NORMAL_LINE.replace("20.00-30.00", "0.00-360.00"),
        );

        let items = translator()
            .translate_reader(log.as_bytes())
            .collect::<Vec<_>>();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(matches!(
            items[1],
            Err(ScrubError::Line {
                line: 4,
                source: FormatError::LossCounter(_)
            })
        ));
        assert_eq!(
            items[2].as_ref().unwrap().timestamp,
            start_time() + TimeDelta::seconds(30)
        );
    }

    #[test]
    fn test_translation_should_survive_invalid_utf8() {
        let mut log = b"20180227_102344\nClient connecting to h\xe9st, UDP port 5001\n".to_vec();
        log.extend_from_slice(NORMAL_LINE.as_bytes());
        log.push(b'\n');

        let records = translator()
            .translate_reader(log.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .expect("Invalid UTF-8 should not fail the translation");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pps.as_deref(), Some("153601"));
    }

    #[test]
    fn test_translate_should_fail_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = translator().translate(dir.path().join("run1-150M-sender.log"));
        assert!(matches!(result, Err(ScrubError::NotFound { .. })));
    }
}
