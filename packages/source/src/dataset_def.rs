//! Config-driven violation dataset definition.
//!
//! A [`DatasetDefinition`] captures everything specific to one published
//! violation dataset: where the timestamp and coordinates live, how the
//! timestamp is formatted, where the map should be centred, and how large a
//! sample to keep. Definitions are TOML, either embedded in the binary (see
//! [`crate::registry`]) or read from disk.

use std::path::Path;

use serde::Deserialize;
use violation_heatmap_violation_models::MapView;

use crate::SourceError;
use crate::sampling::SamplePolicy;

/// Timestamp format used by the MTA camera-enforcement exports,
/// e.g. `09/15/2024 07:42:10 PM`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// A complete, config-driven dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"mta_bus_ace"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// City the dataset covers.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// File name the dataset is published under; used when no input path is
    /// given.
    pub default_input: String,
    /// Column mappings.
    pub fields: FieldMapping,
    /// Initial map viewport. Also the location of sentinel points.
    #[serde(default)]
    pub map: MapView,
    /// How many valid records to keep.
    #[serde(default)]
    pub sampling: SamplePolicy,
}

/// Column names and formats for the required fields.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Column holding the violation timestamp.
    pub occurred_at: String,
    /// Column holding the latitude.
    pub latitude: String,
    /// Column holding the longitude.
    pub longitude: String,
    /// `chrono` format string for [`Self::occurred_at`].
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// Field delimiter (default: comma).
    #[serde(default)]
    pub delimiter: Option<String>,
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_owned()
}

impl FieldMapping {
    /// Delimiter byte for the CSV reader.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter
            .as_deref()
            .and_then(|d| d.as_bytes().first().copied())
            .unwrap_or(b',')
    }
}

/// Parses a [`DatasetDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`SourceError::Definition`] if the TOML is malformed or missing
/// required fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    toml::de::from_str(toml_str).map_err(|e| SourceError::Definition {
        message: e.to_string(),
    })
}

/// Reads and parses a [`DatasetDefinition`] from a TOML file.
///
/// # Errors
///
/// Returns [`SourceError::Open`] if the file cannot be read, or
/// [`SourceError::Definition`] if it does not parse.
pub fn load_dataset_toml(path: &Path) -> Result<DatasetDefinition, SourceError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset_toml(&contents)
}
