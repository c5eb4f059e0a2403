#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for rendering weekly traffic-violation heatmaps.
//!
//! ```text
//! violation_heatmap render [--input FILE] [--output FILE] [--dataset ID|PATH]
//!                          [--sample all|head|tail|reservoir] [--limit N] [--seed N]
//! violation_heatmap grid [--input FILE] [--dataset ID|PATH] [--csv FILE] [--processed FILE]
//!                        [--heatmap [FILE]]
//! violation_heatmap datasets
//! ```
//!
//! Running with no subcommand enters interactive mode. Log verbosity is
//! controlled by `RUST_LOG` (default `info`).

mod interactive;
mod pipeline;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use violation_heatmap_cli_utils::{IndicatifProgress, init_logger};
use violation_heatmap_generate::{DEFAULT_OUTPUT, OVERVIEW_OUTPUT};
use violation_heatmap_source::registry::{DEFAULT_DATASET_ID, all_datasets, resolve_dataset};
use violation_heatmap_violation_models::LAYER_COUNT;

use crate::pipeline::{GridOutputs, RenderSummary, RunInput, SampleStrategy, resolve_policy};

#[derive(Parser)]
#[command(
    name = "violation_heatmap",
    about = "Render traffic violations as a day-of-week by time-of-day heatmap"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the 35-layer slider heatmap page
    Render {
        #[command(flatten)]
        input: InputArgs,
        /// Output HTML file
        #[arg(long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Print violation counts by day of week and hour of day
    Grid {
        #[command(flatten)]
        input: InputArgs,
        /// Also write the 7 x 24 grid as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Also write every kept record with its day and hour as CSV
        #[arg(long)]
        processed: Option<PathBuf>,
        /// Also write a single heatmap page of every kept record
        #[arg(long, num_args = 0..=1, default_missing_value = OVERVIEW_OUTPUT)]
        heatmap: Option<PathBuf>,
    },
    /// List the bundled dataset definitions
    Datasets,
}

#[derive(Args)]
struct InputArgs {
    /// Input CSV file (defaults to the dataset's published file name)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Bundled dataset id or path to a dataset TOML file
    #[arg(long, default_value = DEFAULT_DATASET_ID)]
    dataset: String,
    /// Sampling strategy (defaults to the dataset's policy)
    #[arg(long, value_enum)]
    sample: Option<SampleStrategy>,
    /// Maximum number of records to keep
    #[arg(long)]
    limit: Option<usize>,
    /// Seed for reservoir sampling
    #[arg(long)]
    seed: Option<u64>,
}

impl InputArgs {
    fn resolve(self) -> Result<RunInput, Box<dyn std::error::Error>> {
        let dataset = resolve_dataset(&self.dataset)?;
        let policy = resolve_policy(dataset.sampling, self.sample, self.limit, self.seed)?;
        Ok(RunInput::new(dataset, self.input, Some(policy)))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = init_logger();

    let Some(command) = cli.command else {
        println!("Traffic Violation Heatmap");
        println!();
        return interactive::run(&multi);
    };

    match command {
        Commands::Render { input, output } => {
            let input = input.resolve()?;
            log::info!(
                "Loading {} ({}) with {} sampling",
                input.path.display(),
                input.dataset.id,
                input.policy
            );
            let progress = IndicatifProgress::rows_spinner(&multi, "Reading violations");
            let summary = pipeline::render(&input, &output, &progress)?;
            print_render_summary(&summary, &output);
        }
        Commands::Grid {
            input,
            csv,
            processed,
            heatmap,
        } => {
            let input = input.resolve()?;
            let outputs = GridOutputs {
                grid_csv: csv,
                processed_csv: processed,
                heatmap_html: heatmap,
            };
            let progress = IndicatifProgress::rows_spinner(&multi, "Reading violations");
            let grid = pipeline::grid(&input, &outputs, &progress)?;

            println!("{grid}");
            if let Some((day, hour, count)) = grid.peak() {
                println!("Busiest hour: {day} {hour:02}:00 ({count} violations)");
            }
        }
        Commands::Datasets => print_datasets(),
    }

    Ok(())
}

pub(crate) fn print_render_summary(summary: &RenderSummary, output: &Path) {
    println!();
    println!("Rows read: {}", summary.stats.rows_read);
    println!("Rows dropped: {}", summary.stats.rows_dropped);
    println!("Total violations processed: {}", summary.kept);
    println!(
        "Violations outside 4-24h: {}",
        summary.kept.saturating_sub(summary.bucketed)
    );
    println!(
        "Time periods available: {} (expected {LAYER_COUNT})",
        summary.layers
    );
    println!("File saved: {}", output.display());
}

pub(crate) fn print_datasets() {
    for dataset in all_datasets() {
        println!(
            "{:<28} {} ({}, {})",
            dataset.id, dataset.name, dataset.city, dataset.state
        );
        println!("{:<28} input: {}", "", dataset.default_input);
        println!("{:<28} sampling: {}", "", dataset.sampling);
    }
}
