//! Streaming CSV loader for violation records.
//!
//! Column names are resolved against the header row once, when the reader is
//! constructed. After that each row is coerced into a fixed-shape
//! [`ViolationRecord`]; rows with a missing or malformed timestamp or
//! coordinate are dropped and counted, never surfaced as errors.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use violation_heatmap_violation_models::ViolationRecord;

use crate::SourceError;
use crate::dataset_def::FieldMapping;
use crate::parsing::{parse_lat_lng_str, parse_timestamp};
use crate::progress::ProgressCallback;
use crate::sampling::SamplePolicy;

/// Number of valid rows between progress updates.
pub const CHUNK_SIZE: u64 = 10_000;

/// Row counters collected while streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows read (excluding the header).
    pub rows_read: u64,
    /// Rows dropped because a required field failed to parse.
    pub rows_dropped: u64,
}

impl LoadStats {
    /// Rows that produced a [`ViolationRecord`].
    #[must_use]
    pub const fn valid_rows(&self) -> u64 {
        self.rows_read - self.rows_dropped
    }
}

/// Header positions of the required columns.
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    occurred_at: usize,
    latitude: usize,
    longitude: usize,
}

/// Iterator over the valid [`ViolationRecord`]s of a delimited text source.
///
/// Yields `Err` only for I/O failures of the underlying reader.
pub struct ViolationReader<R: Read> {
    rows: csv::StringRecordsIntoIter<R>,
    columns: ColumnIndices,
    timestamp_format: String,
    stats: LoadStats,
}

impl<R: Read> ViolationReader<R> {
    /// Reads the header row and resolves the configured columns.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumn`] if a configured column is not
    /// in the header, or [`SourceError::Csv`] if the header cannot be read.
    pub fn new(reader: R, fields: &FieldMapping) -> Result<Self, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(fields.delimiter_byte())
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
            .collect();

        let columns = ColumnIndices {
            occurred_at: find_column(&headers, &fields.occurred_at)?,
            latitude: find_column(&headers, &fields.latitude)?,
            longitude: find_column(&headers, &fields.longitude)?,
        };

        log::debug!(
            "Resolved columns: occurred_at={}, latitude={}, longitude={}",
            columns.occurred_at,
            columns.latitude,
            columns.longitude
        );

        Ok(Self {
            rows: csv_reader.into_records(),
            columns,
            timestamp_format: fields.timestamp_format.clone(),
            stats: LoadStats::default(),
        })
    }

    /// Counters for the rows consumed so far.
    #[must_use]
    pub const fn stats(&self) -> LoadStats {
        self.stats
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Option<ViolationRecord> {
        let occurred_at = parse_timestamp(row.get(self.columns.occurred_at)?, &self.timestamp_format)?;
        let (latitude, longitude) = parse_lat_lng_str(
            row.get(self.columns.latitude)?,
            row.get(self.columns.longitude)?,
        )?;
        Some(ViolationRecord::new(occurred_at, latitude, longitude))
    }
}

impl<R: Read> Iterator for ViolationReader<R> {
    type Item = Result<ViolationRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = self.rows.next()?;
            self.stats.rows_read += 1;

            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Some(Err(e.into())),
                Err(e) => {
                    log::debug!("Dropping unreadable row {}: {e}", self.stats.rows_read);
                    self.stats.rows_dropped += 1;
                    continue;
                }
            };

            if let Some(record) = self.parse_row(&row) {
                return Some(Ok(record));
            }
            self.stats.rows_dropped += 1;
        }
    }
}

fn find_column(headers: &[String], column: &str) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| SourceError::MissingColumn {
            column: column.to_owned(),
        })
}

/// Records kept from one input file, plus the row counters.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub records: Vec<ViolationRecord>,
    pub stats: LoadStats,
}

/// Streams `path`, applies `policy`, and returns the kept records.
///
/// Logs a running count every [`CHUNK_SIZE`] valid rows. The file is closed
/// before this returns.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened, the header lacks a
/// configured column, or a read fails.
pub fn load_file(
    path: &Path,
    fields: &FieldMapping,
    policy: &SamplePolicy,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedDataset, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Reading {} ({policy})", path.display());
    progress.set_message(format!("Reading {}", path.display()));

    let mut reader = ViolationReader::new(BufReader::new(file), fields)?;
    let mut valid: u64 = 0;

    let records = policy.sample(reader.by_ref().inspect(|item| {
        if item.is_ok() {
            valid += 1;
            if valid % CHUNK_SIZE == 0 {
                progress.inc(CHUNK_SIZE);
                log::info!("Processed {valid} valid rows...");
            }
        }
    }))?;

    progress.inc(valid % CHUNK_SIZE);

    let stats = reader.stats();
    progress.finish(format!(
        "Read {} rows ({} valid, {} dropped)",
        stats.rows_read,
        stats.valid_rows(),
        stats.rows_dropped
    ));
    log::info!(
        "Read {} rows from {}: {} valid, {} dropped, {} kept",
        stats.rows_read,
        path.display(),
        stats.valid_rows(),
        stats.rows_dropped,
        records.len()
    );

    Ok(LoadedDataset { records, stats })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use violation_heatmap_violation_models::DayOfWeek;

    use super::*;
    use crate::dataset_def::DEFAULT_TIMESTAMP_FORMAT;
    use crate::progress::null_progress;

    fn fields() -> FieldMapping {
        FieldMapping {
            occurred_at: "First Occurrence".to_string(),
            latitude: "Violation Latitude".to_string(),
            longitude: "Violation Longitude".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            delimiter: None,
        }
    }

    const SAMPLE: &str = "\
Violation ID,First Occurrence,Violation Latitude,Violation Longitude,Bus Route ID
1,01/15/2024 09:30:00 AM,40.7580,-73.9855,M15
2,not a date,40.7580,-73.9855,M15
3,01/15/2024 09:45:00 AM,,-73.9855,M15
4,01/16/2024 02:10:00 AM,40.8000,-73.9000,BX12
5,01/16/2024 07:05:00 PM,abc,-73.9000,BX12
6,01/21/2024 11:59:59 PM,40.6500,-73.9500
";

    #[test]
    fn keeps_valid_rows_and_counts_dropped() {
        let mut reader = ViolationReader::new(SAMPLE.as_bytes(), &fields()).unwrap();
        let records: Vec<ViolationRecord> = reader.by_ref().map(Result::unwrap).collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].day_of_week(), DayOfWeek::Monday);
        assert_eq!(records[0].hour(), 9);
        assert_eq!(records[1].hour(), 2);
        assert_eq!(records[2].day_of_week(), DayOfWeek::Sunday);
        assert_eq!(records[2].hour(), 23);

        let stats = reader.stats();
        assert_eq!(stats.rows_read, 6);
        assert_eq!(stats.rows_dropped, 3);
        assert_eq!(stats.valid_rows(), 3);
    }

    #[test]
    fn drops_rows_missing_the_coordinate_columns() {
        let csv = "First Occurrence,Violation Latitude,Violation Longitude\n\
                   01/15/2024 09:30:00 AM,40.7580\n";
        let mut reader = ViolationReader::new(csv.as_bytes(), &fields()).unwrap();
        assert!(reader.next().is_none());
        assert_eq!(reader.stats().rows_dropped, 1);
    }

    #[test]
    fn errors_on_missing_column() {
        let csv = "First Occurrence,Latitude,Longitude\n";
        let Err(err) = ViolationReader::new(csv.as_bytes(), &fields()) else {
            panic!("expected missing column error");
        };
        assert!(
            matches!(&err, SourceError::MissingColumn { column } if column == "Violation Latitude")
        );
    }

    #[test]
    fn honours_delimiter_and_bom() {
        let mut fields = fields();
        fields.delimiter = Some(";".to_string());
        let csv = "\u{feff}First Occurrence;Violation Latitude;Violation Longitude\n\
                   03/01/2024 04:00:00 PM;40.7;-73.9\n";
        let records: Vec<ViolationRecord> = ViolationReader::new(csv.as_bytes(), &fields)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hour(), 16);
    }

    #[test]
    fn load_file_applies_sampling_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let loaded = load_file(
            file.path(),
            &fields(),
            &SamplePolicy::Tail { limit: 2 },
            &null_progress(),
        )
        .unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].hour(), 2);
        assert_eq!(loaded.stats.rows_read, 6);
    }

    #[derive(Default)]
    struct RecordingProgress {
        rows: AtomicU64,
        messages: Mutex<Vec<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn inc(&self, delta: u64) {
            self.rows.fetch_add(delta, Ordering::Relaxed);
        }

        fn set_message(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }

        fn finish(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
    }

    #[test]
    fn load_file_reports_progress() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        load_file(file.path(), &fields(), &SamplePolicy::All, &progress).unwrap();

        assert_eq!(recorder.rows.load(Ordering::Relaxed), 3);
        let messages = recorder.messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Reading "));
        assert_eq!(messages[1], "Read 6 rows (3 valid, 3 dropped)");
    }

    #[test]
    fn load_file_reports_missing_input() {
        let err = load_file(
            Path::new("/nonexistent/violations.csv"),
            &fields(),
            &SamplePolicy::All,
            &null_progress(),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }
}
