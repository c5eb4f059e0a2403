//! Dataset registry: definitions embedded from `packages/source/datasets/`.
//!
//! Each `.toml` file is baked into the binary at compile time via
//! [`include_str!`]. Adding a dataset means adding a TOML file and an entry
//! below.

use std::path::Path;

use crate::SourceError;
use crate::dataset_def::{DatasetDefinition, load_dataset_toml, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("mta_bus_ace", include_str!("../datasets/mta_bus_ace.toml")),
    (
        "mta_bus_ace_processed",
        include_str!("../datasets/mta_bus_ace_processed.toml"),
    ),
];

/// Dataset used when none is specified.
pub const DEFAULT_DATASET_ID: &str = "mta_bus_ace";

/// Returns all embedded dataset definitions.
///
/// # Panics
///
/// Panics if an embedded TOML config is malformed (caught by the tests
/// below).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up an embedded dataset by id.
#[must_use]
pub fn find_dataset(id: &str) -> Option<DatasetDefinition> {
    all_datasets().into_iter().find(|d| d.id == id)
}

/// Resolves `id_or_path` to a definition: an embedded id first, then a TOML
/// file on disk.
///
/// # Errors
///
/// Returns [`SourceError::UnknownDataset`] if neither matches, or the error
/// from reading the definition file.
pub fn resolve_dataset(id_or_path: &str) -> Result<DatasetDefinition, SourceError> {
    if let Some(def) = find_dataset(id_or_path) {
        return Ok(def);
    }

    let path = Path::new(id_or_path);
    if path.is_file() {
        log::info!("Loading dataset definition from {}", path.display());
        return load_dataset_toml(path);
    }

    Err(SourceError::UnknownDataset(id_or_path.to_owned()))
}
