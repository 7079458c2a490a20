//! Loads and persists curriculum datasets.
//!
//! The on-disk format follows the file extension: `.json` files are JSON,
//! everything else is YAML. Loading runs the schema shape check before typed
//! deserialization so structural problems surface as one `MalformedData`
//! report. Saving writes through a temporary file in the destination
//! directory and renames it into place.

use crate::catalog::model::Dataset;
use crate::error::RepositoryError;
use crate::schema::validate_dataset_shape;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    Yaml,
    Json,
}

impl DatasetFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DatasetFormat::Json,
            _ => DatasetFormat::Yaml,
        }
    }
}

/// Read and validate a dataset from disk.
pub fn load_dataset(path: &Path) -> Result<Dataset, RepositoryError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => RepositoryError::NotFound(path.to_path_buf()),
        _ => RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let dataset = parse_dataset(&text, DatasetFormat::for_path(path)).map_err(|detail| {
        RepositoryError::MalformedData {
            path: path.to_path_buf(),
            detail,
        }
    })?;
    debug!(
        path = %path.display(),
        disciplines = dataset.disciplines.len(),
        mappings = dataset.mappings.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Parse dataset text in the given format.
///
/// Errors are human-readable descriptions; callers attach the source path.
pub fn parse_dataset(text: &str, format: DatasetFormat) -> Result<Dataset, String> {
    match format {
        DatasetFormat::Json => {
            let document: serde_json::Value =
                serde_json::from_str(text).map_err(|err| format!("invalid JSON: {err}"))?;
            check_shape(&document)?;
            serde_json::from_str(text).map_err(|err| err.to_string())
        }
        DatasetFormat::Yaml => {
            let document: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|err| format!("invalid YAML: {err}"))?;
            if document.is_null() {
                return Err("document is empty".to_string());
            }
            let as_json = serde_json::to_value(&document)
                .map_err(|err| format!("document is not representable as JSON: {err}"))?;
            check_shape(&as_json)?;
            serde_yaml::from_value(document).map_err(|err| err.to_string())
        }
    }
}

fn check_shape(document: &serde_json::Value) -> Result<(), String> {
    validate_dataset_shape(document).map_err(|errors| {
        format!("schema validation failed:\n{}", errors.join("\n"))
    })
}

/// Write a dataset to `path` in the format its extension selects.
///
/// Unknown top-level keys captured at load time are written back.
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<(), RepositoryError> {
    let rendered = render_dataset(dataset, DatasetFormat::for_path(path)).map_err(|detail| {
        RepositoryError::MalformedData {
            path: path.to_path_buf(),
            detail,
        }
    })?;
    write_atomically(path, rendered.as_bytes()).map_err(|source| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn render_dataset(dataset: &Dataset, format: DatasetFormat) -> Result<String, String> {
    match format {
        DatasetFormat::Json => serde_json::to_string_pretty(dataset)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|err| err.to_string()),
        DatasetFormat::Yaml => serde_yaml::to_string(dataset).map_err(|err| err.to_string()),
    }
}

/// Replace `path` with `contents` via a sibling temporary file.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
