//! Writes records back out with their derived calendar fields.
//!
//! The output keeps the dataset's own column names for the timestamp and
//! coordinates, so the `mta_bus_ace_processed` definition can read it back.

use std::io::Write;

use violation_heatmap_violation_models::ViolationRecord;

use crate::SourceError;
use crate::dataset_def::FieldMapping;

/// Timestamp format of the processed file.
pub const PROCESSED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes one row per record: timestamp, latitude, longitude, `day_of_week`
/// (Monday = 0) and `hour`.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if writing fails.
pub fn write_processed_csv<W: Write>(
    writer: W,
    fields: &FieldMapping,
    records: &[ViolationRecord],
) -> Result<(), SourceError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        fields.occurred_at.as_str(),
        fields.latitude.as_str(),
        fields.longitude.as_str(),
        "day_of_week",
        "hour",
    ])?;

    for record in records {
        csv_writer.write_record([
            record
                .occurred_at
                .format(PROCESSED_TIMESTAMP_FORMAT)
                .to_string(),
            record.latitude.to_string(),
            record.longitude.to_string(),
            record.day_of_week().index().to_string(),
            record.hour().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::loader::ViolationReader;

    fn fields(format: &str) -> FieldMapping {
        FieldMapping {
            occurred_at: "First Occurrence".to_string(),
            latitude: "Violation Latitude".to_string(),
            longitude: "Violation Longitude".to_string(),
            timestamp_format: format.to_string(),
            delimiter: None,
        }
    }

    #[test]
    fn writes_derived_columns_readable_by_loader() {
        let occurred_at = NaiveDate::from_ymd_opt(2024, 1, 20)
            .unwrap()
            .and_hms_opt(17, 5, 0)
            .unwrap();
        let records = vec![ViolationRecord::new(occurred_at, 40.75, -73.98)];

        let mut out = Vec::new();
        write_processed_csv(&mut out, &fields(PROCESSED_TIMESTAMP_FORMAT), &records).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "First Occurrence,Violation Latitude,Violation Longitude,day_of_week,hour\n\
             2024-01-20 17:05:00,40.75,-73.98,5,17\n"
        );

        let reread: Vec<ViolationRecord> =
            ViolationReader::new(text.as_bytes(), &fields(PROCESSED_TIMESTAMP_FORMAT))
                .unwrap()
                .map(Result::unwrap)
                .collect();
        assert_eq!(reread, records);
    }
}
