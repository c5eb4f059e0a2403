//! Day-of-week x hour-of-day count matrix.
//!
//! Unlike the heat layers this covers all 24 hours, including the overnight
//! hours no time period claims.

use std::io::Write;

use violation_heatmap_violation_models::{DAYS_PER_WEEK, DayOfWeek, ViolationRecord};

use crate::HeatmapError;

pub const HOURS_PER_DAY: usize = 24;

/// 7 x 24 violation counts, rows Monday..Sunday, columns hour 0..23.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyGrid {
    counts: [[u64; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl Default for HourlyGrid {
    fn default() -> Self {
        Self {
            counts: [[0; HOURS_PER_DAY]; DAYS_PER_WEEK],
        }
    }
}

impl HourlyGrid {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ViolationRecord>,
    {
        records.into_iter().fold(Self::default(), Self::absorb)
    }

    /// Fold step: returns the grid with `record` counted.
    #[must_use]
    pub fn absorb(mut self, record: &ViolationRecord) -> Self {
        self.counts[record.day_of_week().index()][record.hour() as usize] += 1;
        self
    }

    /// Count for one cell. Hours past 23 count as zero.
    #[must_use]
    pub fn count(&self, day: DayOfWeek, hour: u32) -> u64 {
        self.counts[day.index()]
            .get(hour as usize)
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub const fn row(&self, day: DayOfWeek) -> &[u64; HOURS_PER_DAY] {
        &self.counts[day.index()]
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// The busiest (day, hour) cell, earliest first on ties. `None` when the
    /// grid is empty.
    #[must_use]
    pub fn peak(&self) -> Option<(DayOfWeek, u32, u64)> {
        let mut best: Option<(DayOfWeek, u32, u64)> = None;
        for day in DayOfWeek::ALL {
            for (hour, &count) in (0u32..).zip(self.row(day)) {
                if count > 0 && best.is_none_or(|(_, _, c)| count > c) {
                    best = Some((day, hour, count));
                }
            }
        }
        best
    }

    /// Writes the pivot as CSV: a `day_of_week` column (Monday = 0) followed
    /// by one column per hour.
    ///
    /// # Errors
    ///
    /// Returns [`HeatmapError::Csv`] if writing fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), HeatmapError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["day_of_week".to_string()];
        header.extend((0..HOURS_PER_DAY).map(|h| h.to_string()));
        csv_writer.write_record(&header)?;

        for day in DayOfWeek::ALL {
            let mut row = vec![day.index().to_string()];
            row.extend(self.row(day).iter().map(u64::to_string));
            csv_writer.write_record(&row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for HourlyGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .max()
            .map_or(1, |max| max.to_string().len())
            .max(2);

        write!(f, "{:<10}", "hour")?;
        for hour in 0..HOURS_PER_DAY {
            write!(f, " {hour:>width$}")?;
        }
        writeln!(f)?;

        for day in DayOfWeek::ALL {
            write!(f, "{:<10}", day.as_ref())?;
            for count in self.row(day) {
                write!(f, " {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
