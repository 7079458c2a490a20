//! Shared library for the curriculum tools.
//!
//! The crate owns the curriculum dataset model and everything that reads it:
//! cross-reference validation, presence matrices, and the publish pipeline
//! that pushes rendered discipline pages to the CMS, records their URLs in a
//! per-dataset link registry, and rewrites the index document against that
//! registry. Binaries under `src/bin/` are thin wrappers over these
//! functions.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fill;
pub mod matrix;
pub mod publish;
pub mod registry;
pub mod rewrite;
mod schema;
pub mod slug;
pub mod template;
pub mod validation;

pub use catalog::{
    Catalog, CompetencyCode, CompetencyKind, Dataset, DatasetIdentity, Discipline,
    DisciplineCategory, DisciplineCode, MappingEntry, Metadata, PageId, ProgramResultCode,
    load_dataset, save_dataset,
};
pub use config::{CmsArgs, CmsConfig};
pub use error::{MetadataError, RegistryError, RepositoryError, TransportError};
pub use matrix::{MatrixReport, PresenceMatrix, Statistics, SummaryRow, build, statistics};
pub use publish::{
    DirectoryContentProvider, HttpTransport, PageContent, PageTransport, PublishEngine,
    PublishHint, PublishResult, PublishStatus, publish_all,
};
pub use registry::{LinkRegistry, RegistryEntries};
pub use rewrite::{IndexRewriter, RewriteOutcome};
pub use slug::slugify;
pub use validation::{UnfilledPolicy, ValidationReport, validate};

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "curricula=info";

/// Install the stderr log subscriber used by every binary.
///
/// `RUST_LOG` overrides the default filter. Calling this twice is harmless;
/// the second install is ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Fail with every validation error, or log the unfilled warning.
///
/// Used by binaries that must not act on a broken dataset.
pub fn ensure_valid(dataset: &Dataset, policy: UnfilledPolicy) -> anyhow::Result<ValidationReport> {
    let report = validate(dataset);
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    if !report.passes(policy) {
        let mut lines: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        if report.is_valid() {
            lines.extend(report.warnings.iter().map(ToString::to_string));
        }
        anyhow::bail!("dataset failed validation:\n  {}", lines.join("\n  "));
    }
    Ok(report)
}
