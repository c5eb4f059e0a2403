#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Violation dataset definitions and the streaming record loader.
//!
//! Each dataset is described by a [`dataset_def::DatasetDefinition`] (column
//! names, timestamp format, map viewport, sampling policy). The
//! [`loader::ViolationReader`] turns a delimited text file into validated
//! [`violation_heatmap_violation_models::ViolationRecord`]s, silently
//! dropping rows that fail coercion.

pub mod dataset_def;
pub mod loader;
pub mod parsing;
pub mod processed;
pub mod progress;
pub mod registry;
pub mod sampling;

use std::path::PathBuf;

/// Errors that can occur while reading a violation dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file open/read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured column is not present in the header row.
    #[error("Column '{column}' not found in header row")]
    MissingColumn {
        /// The configured column name.
        column: String,
    },

    /// A dataset definition could not be parsed.
    #[error("Invalid dataset definition: {message}")]
    Definition {
        /// Description of what went wrong.
        message: String,
    },

    /// No embedded dataset or definition file matches the given name.
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),
}
