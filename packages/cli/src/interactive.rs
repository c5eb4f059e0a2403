//! Interactive menu used when no subcommand is given.
//!
//! Walks the user through dataset, input file, sampling and output choices
//! with `dialoguer` prompts instead of command-line flags.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use violation_heatmap_cli_utils::{IndicatifProgress, MultiProgress};
use violation_heatmap_generate::DEFAULT_OUTPUT;
use violation_heatmap_source::registry::all_datasets;
use violation_heatmap_source::sampling::SamplePolicy;

use crate::pipeline::{self, GridOutputs, RunInput, SampleStrategy, resolve_policy};
use crate::{print_datasets, print_render_summary};

/// Top-level actions offered by the menu.
enum Action {
    Render,
    Grid,
    Datasets,
}

impl Action {
    const ALL: &[Self] = &[Self::Render, Self::Grid, Self::Datasets];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Render => "Render weekly heatmap",
            Self::Grid => "Show day x hour grid",
            Self::Datasets => "List datasets",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Datasets => {
            print_datasets();
            Ok(())
        }
        Action::Render => {
            let input = prompt_input()?;
            let output: String = Input::new()
                .with_prompt("Output HTML file")
                .default(DEFAULT_OUTPUT.to_string())
                .interact_text()?;

            let progress = IndicatifProgress::rows_spinner(multi, "Reading violations");
            let output = PathBuf::from(output);
            let summary = pipeline::render(&input, &output, &progress)?;
            print_render_summary(&summary, &output);
            Ok(())
        }
        Action::Grid => {
            let input = prompt_input()?;
            let progress = IndicatifProgress::rows_spinner(multi, "Reading violations");
            let grid = pipeline::grid(&input, &GridOutputs::default(), &progress)?;
            println!("{grid}");
            Ok(())
        }
    }
}

/// Prompts for dataset, input path and sampling policy.
fn prompt_input() -> Result<RunInput, Box<dyn std::error::Error>> {
    let datasets = all_datasets();
    let names: Vec<String> = datasets
        .iter()
        .map(|d| format!("{} ({})", d.name, d.id))
        .collect();

    let idx = Select::new()
        .with_prompt("Dataset")
        .items(&names)
        .default(0)
        .interact()?;
    let dataset = datasets[idx].clone();

    let path: String = Input::new()
        .with_prompt("Input CSV file")
        .default(dataset.default_input.clone())
        .interact_text()?;

    let policy = prompt_policy(dataset.sampling)?;

    Ok(RunInput::new(dataset, Some(PathBuf::from(path)), Some(policy)))
}

fn prompt_policy(base: SamplePolicy) -> Result<SamplePolicy, Box<dyn std::error::Error>> {
    let labels: Vec<&str> = SampleStrategy::ALL.iter().map(|s| s.label()).collect();
    let current = SampleStrategy::ALL
        .iter()
        .position(|&s| resolve_policy(base, Some(s), None, None).ok() == Some(base))
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt(format!("Sampling (dataset default: {base})"))
        .items(&labels)
        .default(current)
        .interact()?;
    let strategy = SampleStrategy::ALL[idx];

    if strategy == SampleStrategy::All {
        return Ok(SamplePolicy::All);
    }

    let limit_str: String = Input::new()
        .with_prompt("Record limit (leave empty for the dataset default)")
        .allow_empty(true)
        .interact_text()?;

    let limit: Option<usize> = if limit_str.trim().is_empty() {
        None
    } else {
        Some(
            limit_str
                .trim()
                .parse()
                .map_err(|e| format!("Invalid limit '{limit_str}': {e}"))?,
        )
    };

    Ok(resolve_policy(base, Some(strategy), limit, None)?)
}
