#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Temporal bucketing and heat layer aggregation.
//!
//! Every [`ViolationRecord`] whose hour falls in 4-23 is assigned to exactly
//! one of 35 (day-of-week, time-period) buckets; records from 00:00-03:59
//! land in none. [`layers::build_layers`] folds a record set into the 35
//! [`HeatLayer`](violation_heatmap_violation_models::HeatLayer)s the map
//! renderer draws, and [`grid::HourlyGrid`] holds the finer 7 x 24 counts.

pub mod grid;
pub mod layers;

use violation_heatmap_violation_models::{BucketKey, TimePeriod, ViolationRecord};

/// Buckets with this many records or fewer get a sentinel point instead of
/// their own points.
pub const SPARSE_THRESHOLD: u64 = 5;

/// Weight of the placeholder point drawn for a sparse bucket.
pub const SENTINEL_WEIGHT: f64 = 0.1;

/// Weight of each real violation point.
pub const RECORD_WEIGHT: f64 = 1.0;

/// Errors that can occur while aggregating or exporting heatmap data.
#[derive(Debug, thiserror::Error)]
pub enum HeatmapError {
    /// There were no valid records to aggregate.
    #[error("No valid violation records to aggregate; check the input file and column mapping")]
    NoRecords,

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns the bucket `record` belongs to, or `None` when its hour is
/// outside every time period (00:00-03:59).
///
/// The timestamp's calendar fields are used as-is, with no timezone
/// conversion.
#[must_use]
pub fn bucket_key(record: &ViolationRecord) -> Option<BucketKey> {
    let period = TimePeriod::for_hour(record.hour())?;
    Some(BucketKey::new(record.day_of_week(), period))
}
