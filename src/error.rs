//! Typed failures for the components whose callers branch on the cause.
//!
//! Binaries wrap these in `anyhow` with command context; library callers
//! match on the variants (a missing registry is not the same situation as a
//! registry recorded for another dataset).

use crate::catalog::DatasetIdentity;
use std::path::PathBuf;
use thiserror::Error;

/// Loading or persisting a curriculum dataset failed.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("malformed dataset {}: {detail}", .path.display())]
    MalformedData { path: PathBuf, detail: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Dataset metadata lacks (or contradicts) a field an operation needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata.{0} is missing or empty")]
    MissingField(&'static str),

    #[error("metadata has no parent page id (set metadata.page_id to a non-zero id)")]
    MissingParentId,

    #[error(
        "metadata.page_id ({page_id}) and deprecated metadata.site_parent_id ({site_parent_id}) disagree; keep only page_id"
    )]
    ConflictingParentIds { page_id: u64, site_parent_id: u64 },
}

/// Reading or writing the link registry failed.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no link registry at {}", .0.display())]
    NotFound(PathBuf),

    #[error(
        "link registry {} was recorded for {stored}, not {requested}",
        .path.display()
    )]
    IdentityMismatch {
        path: PathBuf,
        stored: DatasetIdentity,
        requested: DatasetIdentity,
    },

    #[error("malformed link registry {}: {detail}", .path.display())]
    Malformed { path: PathBuf, detail: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The request never produced an HTTP response (connectivity, timeout,
/// TLS, client construction).
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}
