//! Load -> bucket -> render, and the hourly grid report.
//!
//! Each run is a single pass: the input file is streamed once, records are
//! folded into buckets, and the page is written once at the end.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use violation_heatmap_generate::{HeatmapStyle, LeafletHeatmap, write_artifact};
use violation_heatmap_heatmap::HeatmapError;
use violation_heatmap_heatmap::grid::HourlyGrid;
use violation_heatmap_heatmap::layers::{build_layers, overview_layer};
use violation_heatmap_source::dataset_def::DatasetDefinition;
use violation_heatmap_source::loader::{LoadStats, load_file};
use violation_heatmap_source::processed::write_processed_csv;
use violation_heatmap_source::progress::ProgressCallback;
use violation_heatmap_source::sampling::{DEFAULT_SEED, SamplePolicy};

/// Sampling strategy names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SampleStrategy {
    All,
    Head,
    Tail,
    Reservoir,
}

impl SampleStrategy {
    pub const ALL: &[Self] = &[Self::All, Self::Head, Self::Tail, Self::Reservoir];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Keep every record",
            Self::Head => "First N records",
            Self::Tail => "Last N records",
            Self::Reservoir => "Random sample of N records",
        }
    }

    const fn of(policy: SamplePolicy) -> Self {
        match policy {
            SamplePolicy::All => Self::All,
            SamplePolicy::Head { .. } => Self::Head,
            SamplePolicy::Tail { .. } => Self::Tail,
            SamplePolicy::Reservoir { .. } => Self::Reservoir,
        }
    }
}

/// Applies command-line overrides to the dataset's sampling policy.
///
/// Unset overrides fall back to the dataset's values.
///
/// # Errors
///
/// Returns an error if the resulting strategy needs a limit and none is
/// available.
pub fn resolve_policy(
    base: SamplePolicy,
    strategy: Option<SampleStrategy>,
    limit: Option<usize>,
    seed: Option<u64>,
) -> Result<SamplePolicy, String> {
    let strategy = strategy.unwrap_or_else(|| SampleStrategy::of(base));
    let limit = limit.or_else(|| base.limit());
    let base_seed = match base {
        SamplePolicy::Reservoir { seed, .. } => seed,
        _ => DEFAULT_SEED,
    };

    let require_limit = || {
        limit.ok_or_else(|| format!("--limit is required for {strategy:?} sampling"))
    };

    Ok(match strategy {
        SampleStrategy::All => SamplePolicy::All,
        SampleStrategy::Head => SamplePolicy::Head {
            limit: require_limit()?,
        },
        SampleStrategy::Tail => SamplePolicy::Tail {
            limit: require_limit()?,
        },
        SampleStrategy::Reservoir => SamplePolicy::Reservoir {
            limit: require_limit()?,
            seed: seed.unwrap_or(base_seed),
        },
    })
}

/// A resolved input: which dataset, which file, how to sample it.
#[derive(Debug, Clone)]
pub struct RunInput {
    pub dataset: DatasetDefinition,
    pub path: PathBuf,
    pub policy: SamplePolicy,
}

impl RunInput {
    /// Uses the dataset's published file name and sampling policy unless
    /// overridden.
    #[must_use]
    pub fn new(
        dataset: DatasetDefinition,
        path: Option<PathBuf>,
        policy: Option<SamplePolicy>,
    ) -> Self {
        let path = path.unwrap_or_else(|| PathBuf::from(&dataset.default_input));
        let policy = policy.unwrap_or(dataset.sampling);
        Self {
            dataset,
            path,
            policy,
        }
    }
}

/// Counts reported after a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub stats: LoadStats,
    /// Records kept by the sampling policy.
    pub kept: u64,
    /// Kept records that landed in some layer.
    pub bucketed: u64,
    pub layers: usize,
}

/// Loads the input, builds the heat layers, and writes the page to
/// `output`.
///
/// # Errors
///
/// Returns an error if loading fails, no valid records are found, or the
/// page cannot be rendered or written. Nothing is written on error.
pub fn render(
    input: &RunInput,
    output: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RenderSummary, Box<dyn std::error::Error>> {
    let loaded = load_file(&input.path, &input.dataset.fields, &input.policy, progress)?;
    log::info!("Using {} rows for full week analysis", loaded.records.len());

    let layer_set = build_layers(&loaded.records, input.dataset.map.center)?;

    let title = format!("{}: violations by day and time period", input.dataset.name);
    let page = LeafletHeatmap::new(&title, input.dataset.map).render(&layer_set.layers)?;
    write_artifact(output, &page)?;

    Ok(RenderSummary {
        stats: loaded.stats,
        kept: layer_set.total_records,
        bucketed: layer_set.bucketed_records(),
        layers: layer_set.layers.len(),
    })
}

/// Optional files written by [`grid`].
#[derive(Debug, Clone, Default)]
pub struct GridOutputs {
    /// The 7 x 24 grid as CSV.
    pub grid_csv: Option<PathBuf>,
    /// Every kept record with its day and hour.
    pub processed_csv: Option<PathBuf>,
    /// A single-layer heatmap page of every kept record.
    pub heatmap_html: Option<PathBuf>,
}

/// Loads the input and builds the 7 x 24 count grid, optionally writing the
/// files named in `outputs`.
///
/// # Errors
///
/// Returns an error if loading fails, no valid records are found, or an
/// output file cannot be rendered or written.
pub fn grid(
    input: &RunInput,
    outputs: &GridOutputs,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<HourlyGrid, Box<dyn std::error::Error>> {
    let loaded = load_file(&input.path, &input.dataset.fields, &input.policy, progress)?;
    if loaded.records.is_empty() {
        return Err(HeatmapError::NoRecords.into());
    }

    let grid = HourlyGrid::from_records(&loaded.records);

    if let Some(path) = &outputs.grid_csv {
        grid.write_csv(BufWriter::new(File::create(path)?))?;
        log::info!("Grid saved: {}", path.display());
    }

    if let Some(path) = &outputs.processed_csv {
        write_processed_csv(
            BufWriter::new(File::create(path)?),
            &input.dataset.fields,
            &loaded.records,
        )?;
        log::info!("Processed records saved: {}", path.display());
    }

    if let Some(path) = &outputs.heatmap_html {
        let layer = overview_layer(&loaded.records)?;
        let title = format!("{}: all violations", input.dataset.name);
        let page = LeafletHeatmap::new(&title, input.dataset.map)
            .with_style(HeatmapStyle::overview())
            .render(std::slice::from_ref(&layer))?;
        write_artifact(path, &page)?;
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use violation_heatmap_source::progress::null_progress;
    use violation_heatmap_source::registry::find_dataset;
    use violation_heatmap_violation_models::DayOfWeek;

    use super::*;

    const HEADER: &str = "Violation ID,First Occurrence,Violation Latitude,Violation Longitude\n";

    fn write_input(dir: &Path, rows: &[&str]) -> PathBuf {
        let path = dir.join("violations.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    fn input(path: PathBuf) -> RunInput {
        RunInput::new(
            find_dataset("mta_bus_ace").unwrap(),
            Some(path),
            Some(SamplePolicy::All),
        )
    }

    #[test]
    fn renders_monday_morning_layer_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows: Vec<String> = (0..6)
            .map(|i| format!("{i},01/15/2024 09:{:02}:00 AM,40.75{i},-73.98", i * 5))
            .collect();
        rows.push("6,01/15/2024 02:00:00 AM,40.70,-73.90".to_string());
        rows.push("7,garbage,40.70,-73.90".to_string());
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let path = write_input(dir.path(), &rows);
        let output = dir.path().join("heatmap.html");

        let summary = render(&input(path), &output, &null_progress()).unwrap();

        assert_eq!(summary.stats.rows_read, 8);
        assert_eq!(summary.stats.rows_dropped, 1);
        assert_eq!(summary.kept, 7);
        assert_eq!(summary.bucketed, 6);
        assert_eq!(summary.layers, 35);

        let page = std::fs::read_to_string(&output).unwrap();
        assert!(page.contains("Monday Morning (8-12h) (6 violations)"));
        assert!(page.contains("Monday Early Morning (4-8h) (0 violations)"));
        assert!(!page.contains("(7 violations)"));
    }

    #[test]
    fn refuses_to_render_without_valid_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), &["1,not a date,40.7,-73.9"]);
        let output = dir.path().join("heatmap.html");

        let err = render(&input(path), &output, &null_progress()).unwrap_err();
        assert!(err.to_string().contains("No valid violation records"));
        assert!(!output.exists());
    }

    #[test]
    fn grid_writes_every_requested_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            &[
                "1,01/20/2024 01:15:00 AM,40.7,-73.9",
                "2,01/20/2024 01:45:00 AM,40.7,-73.9",
            ],
        );
        let grid_csv = dir.path().join("grid.csv");
        let processed = dir.path().join("processed.csv");

        let heatmap = dir.path().join("violations_heatmap.html");

        let outputs = GridOutputs {
            grid_csv: Some(grid_csv.clone()),
            processed_csv: Some(processed.clone()),
            heatmap_html: Some(heatmap.clone()),
        };
        let grid = grid(&input(path), &outputs, &null_progress()).unwrap();

        assert_eq!(grid.count(DayOfWeek::Saturday, 1), 2);
        assert_eq!(std::fs::read_to_string(&grid_csv).unwrap().lines().count(), 8);

        let processed_text = std::fs::read_to_string(&processed).unwrap();
        assert!(processed_text.contains("2024-01-20 01:15:00,40.7,-73.9,5,1"));

        let page = std::fs::read_to_string(&heatmap).unwrap();
        assert!(page.contains("All violations (2 violations)"));
        assert!(page.contains("\"radius\":8"));
    }

    #[test]
    fn zero_limit_samples_leave_nothing_to_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            &["1,01/15/2024 09:00:00 AM,40.7,-73.9", "2,01/15/2024 10:00:00 AM,40.7,-73.9"],
        );
        let output = dir.path().join("heatmap.html");

        for policy in [
            SamplePolicy::Head { limit: 0 },
            SamplePolicy::Reservoir { limit: 0, seed: 1 },
        ] {
            let input = RunInput::new(
                find_dataset("mta_bus_ace").unwrap(),
                Some(path.clone()),
                Some(policy),
            );
            let err = render(&input, &output, &null_progress()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<HeatmapError>(),
                Some(HeatmapError::NoRecords)
            ));
            assert!(!output.exists());
        }
    }

    #[test]
    fn policy_overrides_fall_back_to_dataset() {
        let base = SamplePolicy::Reservoir {
            limit: 1_000,
            seed: 9,
        };

        assert_eq!(resolve_policy(base, None, None, None).unwrap(), base);
        assert_eq!(
            resolve_policy(base, Some(SampleStrategy::Tail), None, None).unwrap(),
            SamplePolicy::Tail { limit: 1_000 }
        );
        assert_eq!(
            resolve_policy(base, None, Some(10), Some(1)).unwrap(),
            SamplePolicy::Reservoir { limit: 10, seed: 1 }
        );
        assert_eq!(
            resolve_policy(base, Some(SampleStrategy::All), None, None).unwrap(),
            SamplePolicy::All
        );
        assert!(resolve_policy(SamplePolicy::All, Some(SampleStrategy::Head), None, None).is_err());
    }
}
