//! Folds records into the 35 heat layers.

use violation_heatmap_violation_models::{
    BucketKey, GeoPoint, HeatLayer, HeatPoint, LAYER_COUNT, ViolationRecord,
};

use crate::{HeatmapError, RECORD_WEIGHT, SENTINEL_WEIGHT, SPARSE_THRESHOLD, bucket_key};

/// Accumulator for [`aggregate`]: the locations in each bucket, in input
/// order, plus the number of records that matched no bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSet {
    cells: [Vec<GeoPoint>; LAYER_COUNT],
    excluded: u64,
}

impl Default for BucketSet {
    fn default() -> Self {
        Self {
            cells: std::array::from_fn(|_| Vec::new()),
            excluded: 0,
        }
    }
}

impl BucketSet {
    /// Fold step: returns the set with `record` added to its bucket.
    #[must_use]
    pub fn absorb(mut self, record: &ViolationRecord) -> Self {
        match bucket_key(record) {
            Some(key) => self.cells[key.index()].push(record.location()),
            None => self.excluded += 1,
        }
        self
    }

    /// Records whose hour fell outside every time period.
    #[must_use]
    pub const fn excluded(&self) -> u64 {
        self.excluded
    }

    /// Records assigned to some bucket.
    #[must_use]
    pub fn bucketed(&self) -> u64 {
        self.cells.iter().map(|c| c.len() as u64).sum()
    }

    /// Converts each bucket into a [`HeatLayer`], in layer order.
    ///
    /// Buckets with at most [`SPARSE_THRESHOLD`] records get a single point
    /// at `sentinel` with weight [`SENTINEL_WEIGHT`], so every layer has
    /// something to draw. The label always carries the true count.
    #[must_use]
    pub fn into_layers(self, sentinel: GeoPoint) -> Vec<HeatLayer> {
        BucketKey::all()
            .zip(self.cells)
            .map(|(key, locations)| into_layer(key, locations, sentinel))
            .collect()
    }
}

fn into_layer(key: BucketKey, locations: Vec<GeoPoint>, sentinel: GeoPoint) -> HeatLayer {
    let count = locations.len() as u64;
    let label = HeatLayer::label_for(key, count);

    let points = if count > SPARSE_THRESHOLD {
        log::info!("{label}");
        locations
            .into_iter()
            .map(|location| HeatPoint::new(location, RECORD_WEIGHT))
            .collect()
    } else {
        log::info!("{label} (low data)");
        vec![HeatPoint::new(sentinel, SENTINEL_WEIGHT)]
    };

    HeatLayer {
        key: Some(key),
        count,
        points,
        label,
    }
}

/// Folds `records` into a [`BucketSet`].
pub fn aggregate<'a, I>(records: I) -> BucketSet
where
    I: IntoIterator<Item = &'a ViolationRecord>,
{
    records
        .into_iter()
        .fold(BucketSet::default(), BucketSet::absorb)
}

/// The layers for one record set, with the counts behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSet {
    /// Exactly [`LAYER_COUNT`] layers, day-major then period-minor.
    pub layers: Vec<HeatLayer>,
    /// Records given to [`build_layers`].
    pub total_records: u64,
    /// Records from 00:00-03:59 that matched no bucket.
    pub excluded_records: u64,
}

impl LayerSet {
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.label.as_str()).collect()
    }

    /// Records that landed in some layer.
    #[must_use]
    pub const fn bucketed_records(&self) -> u64 {
        self.total_records - self.excluded_records
    }
}

/// Builds the 35 heat layers for `records`.
///
/// # Errors
///
/// Returns [`HeatmapError::NoRecords`] if `records` is empty.
pub fn build_layers(
    records: &[ViolationRecord],
    sentinel: GeoPoint,
) -> Result<LayerSet, HeatmapError> {
    if records.is_empty() {
        return Err(HeatmapError::NoRecords);
    }

    log::info!("Processing all day/time combinations...");
    let buckets = aggregate(records);
    let excluded_records = buckets.excluded();
    if excluded_records > 0 {
        log::info!("{excluded_records} records between 00:00 and 03:59 are outside every period");
    }

    let layers = buckets.into_layers(sentinel);
    log::info!("Total periods created: {}", layers.len());

    Ok(LayerSet {
        layers,
        total_records: records.len() as u64,
        excluded_records,
    })
}

/// Builds one layer holding every record at full weight, whatever its hour.
///
/// # Errors
///
/// Returns [`HeatmapError::NoRecords`] if `records` is empty.
pub fn overview_layer(records: &[ViolationRecord]) -> Result<HeatLayer, HeatmapError> {
    if records.is_empty() {
        return Err(HeatmapError::NoRecords);
    }

    let count = records.len() as u64;
    Ok(HeatLayer {
        key: None,
        count,
        points: records
            .iter()
            .map(|r| HeatPoint::new(r.location(), RECORD_WEIGHT))
            .collect(),
        label: HeatLayer::overview_label(count),
    })
}
