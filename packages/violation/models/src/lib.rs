#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the violation heatmap toolchain.
//!
//! A [`ViolationRecord`] is the validated, fixed-shape form of one input row.
//! The heatmap is organised as a 7 x 5 grid of [`DayOfWeek`] x [`TimePeriod`]
//! cells, each rendered as one [`HeatLayer`].

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of days in the weekly grid.
pub const DAYS_PER_WEEK: usize = 7;

/// Number of time periods per day.
pub const PERIODS_PER_DAY: usize = 5;

/// Total number of (day, period) layers.
pub const LAYER_COUNT: usize = DAYS_PER_WEEK * PERIODS_PER_DAY;

/// Latitude/longitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// New York City Hall, the reference point used by the bundled MTA dataset.
    pub const NEW_YORK_CITY: Self = Self::new(40.7128, -74.0060);

    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A single traffic violation after validation.
///
/// The loader guarantees all three fields are present and well-formed; rows
/// that fail coercion never become a `ViolationRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    /// Local wall-clock time of the first occurrence. No timezone is applied.
    pub occurred_at: NaiveDateTime,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

impl ViolationRecord {
    #[must_use]
    pub const fn new(occurred_at: NaiveDateTime, latitude: f64, longitude: f64) -> Self {
        Self {
            occurred_at,
            latitude,
            longitude,
        }
    }

    /// Day of the week the violation occurred on.
    #[must_use]
    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from_datetime(&self.occurred_at)
    }

    /// Hour of day (0-23) the violation occurred in.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.occurred_at.hour()
    }

    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Day of the week, Monday first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl DayOfWeek {
    /// All days in grid order.
    pub const ALL: [Self; DAYS_PER_WEEK] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Zero-based index, Monday = 0 .. Sunday = 6.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the day at the given zero-based index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < DAYS_PER_WEEK {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Derives the day from the timestamp's calendar fields.
    #[must_use]
    pub fn from_datetime(timestamp: &NaiveDateTime) -> Self {
        // num_days_from_monday is always 0..=6
        Self::ALL[timestamp.weekday().num_days_from_monday() as usize]
    }
}

/// One of the five fixed hour ranges a day is split into.
///
/// Ranges are half-open (`start_hour..end_hour`). Hours 0-3 belong to no
/// period, so overnight violations never reach a layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimePeriod {
    /// 04:00 - 07:59
    EarlyMorning,
    /// 08:00 - 11:59
    Morning,
    /// 12:00 - 15:59
    Afternoon,
    /// 16:00 - 19:59
    Evening,
    /// 20:00 - 23:59
    Night,
}

impl TimePeriod {
    /// All periods in declaration order.
    pub const ALL: [Self; PERIODS_PER_DAY] = [
        Self::EarlyMorning,
        Self::Morning,
        Self::Afternoon,
        Self::Evening,
        Self::Night,
    ];

    #[must_use]
    pub const fn start_hour(self) -> u32 {
        match self {
            Self::EarlyMorning => 4,
            Self::Morning => 8,
            Self::Afternoon => 12,
            Self::Evening => 16,
            Self::Night => 20,
        }
    }

    /// Exclusive end hour.
    #[must_use]
    pub const fn end_hour(self) -> u32 {
        match self {
            Self::EarlyMorning => 8,
            Self::Morning => 12,
            Self::Afternoon => 16,
            Self::Evening => 20,
            Self::Night => 24,
        }
    }

    /// Human-readable label, e.g. `"Morning (8-12h)"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EarlyMorning => "Early Morning (4-8h)",
            Self::Morning => "Morning (8-12h)",
            Self::Afternoon => "Afternoon (12-16h)",
            Self::Evening => "Evening (16-20h)",
            Self::Night => "Night (20-24h)",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn contains(self, hour: u32) -> bool {
        hour >= self.start_hour() && hour < self.end_hour()
    }

    /// Returns the period containing `hour`, or `None` for hours 0-3 (and
    /// anything outside 0-23).
    #[must_use]
    pub fn for_hour(hour: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|period| period.contains(hour))
    }
}

/// Identifies one cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    pub day: DayOfWeek,
    pub period: TimePeriod,
}

impl BucketKey {
    #[must_use]
    pub const fn new(day: DayOfWeek, period: TimePeriod) -> Self {
        Self { day, period }
    }

    /// Position of this cell in layer order (day-major, period-minor).
    #[must_use]
    pub const fn index(self) -> usize {
        self.day.index() * PERIODS_PER_DAY + self.period.index()
    }

    /// Inverse of [`Self::index`].
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match DayOfWeek::from_index(index / PERIODS_PER_DAY) {
            Some(day) => Some(Self::new(day, TimePeriod::ALL[index % PERIODS_PER_DAY])),
            None => None,
        }
    }

    /// Every key in layer order.
    pub fn all() -> impl Iterator<Item = Self> {
        DayOfWeek::ALL.into_iter().flat_map(|day| {
            TimePeriod::ALL
                .into_iter()
                .map(move |period| Self::new(day, period))
        })
    }
}

/// Formats as the label prefix shared by every layer for this cell, e.g.
/// `"Monday Morning (8-12h)"`.
impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.day, self.period.label())
    }
}

/// A weighted point in a heat layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub weight: f64,
}

impl HeatPoint {
    #[must_use]
    pub const fn new(location: GeoPoint, weight: f64) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            weight,
        }
    }

    /// `[lat, lng, intensity]` triple as consumed by `leaflet.heat`.
    #[must_use]
    pub const fn as_triple(&self) -> [f64; 3] {
        [self.latitude, self.longitude, self.weight]
    }
}

/// One toggle-able overlay of the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatLayer {
    /// The cell this layer draws; `None` for the all-records overview.
    pub key: Option<BucketKey>,
    /// True number of records in this cell, even when `points` holds only a
    /// sentinel.
    pub count: u64,
    pub points: Vec<HeatPoint>,
    /// `"{day} {period} ({count} violations)"`.
    pub label: String,
}

impl HeatLayer {
    /// Builds the display label for a cell with `count` records.
    #[must_use]
    pub fn label_for(key: BucketKey, count: u64) -> String {
        format!("{key} ({count} violations)")
    }

    /// Label for the single layer covering every record.
    #[must_use]
    pub fn overview_label(count: u64) -> String {
        format!("All violations ({count} violations)")
    }
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: GeoPoint::NEW_YORK_CITY,
            zoom: 11,
        }
    }
}
