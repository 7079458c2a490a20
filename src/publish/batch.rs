//! Sequential publish of a whole page set.
//!
//! One page at a time, no retries. A failing page is recorded and the batch
//! moves on. The returned entries cover successful pages only; the caller
//! writes them to the registry once, after the batch.

use crate::catalog::{DatasetIdentity, PageId};
use crate::publish::content::{ContentIssue, PageContent};
use crate::publish::engine::{PublishEngine, PublishHint, PublishResult, PublishStatus};
use crate::publish::transport::PageTransport;
use crate::registry::RegistryEntries;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    pub results: Vec<PublishResult>,
}

impl PublishSummary {
    pub fn count(&self, status: PublishStatus) -> usize {
        self.results
            .iter()
            .filter(|result| result.status == status)
            .count()
    }

    pub fn with_status(&self, status: PublishStatus) -> impl Iterator<Item = &PublishResult> {
        self.results
            .iter()
            .filter(move |result| result.status == status)
    }

    pub fn has_failures(&self) -> bool {
        self.count(PublishStatus::Failed) > 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub summary: PublishSummary,
    /// Links and ids of every page that ended created or updated.
    pub entries: RegistryEntries,
}

/// Publish `pages` in order under `parent`.
///
/// `prior` is what the registry held for `identity` before this run; a page
/// id recorded there pins the update and skips the slug lookup.
pub fn publish_all<T: PageTransport>(
    engine: &PublishEngine<T>,
    pages: Vec<Result<PageContent, ContentIssue>>,
    identity: &DatasetIdentity,
    parent: Option<PageId>,
    prior: Option<&RegistryEntries>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    info!(identity = %identity, pages = pages.len(), "publishing pages");

    for page in pages {
        let result = match page {
            Ok(content) => {
                let pinned = content
                    .code
                    .as_ref()
                    .and_then(|code| prior.and_then(|prior| prior.page_ids.get(code)))
                    .copied();
                let hint = PublishHint {
                    page_id: pinned,
                    parent,
                    ..PublishHint::default()
                };
                engine.publish(&content, &hint)
            }
            Err(issue) => {
                let label = issue
                    .code
                    .as_ref()
                    .map(|code| code.0.clone())
                    .unwrap_or_else(|| issue.source.display().to_string());
                warn!(source = %issue.source.display(), message = %issue.message, "page skipped");
                PublishResult::failed(issue.code, label, issue.message)
            }
        };

        if result.is_success() {
            if let Some(code) = &result.code {
                if let Some(url) = &result.url {
                    outcome.entries.links.insert(code.clone(), url.clone());
                }
                if let Some(id) = result.page_id {
                    outcome.entries.page_ids.insert(code.clone(), id);
                }
            }
        }
        outcome.summary.results.push(result);
    }

    info!(
        created = outcome.summary.count(PublishStatus::Created),
        updated = outcome.summary.count(PublishStatus::Updated),
        failed = outcome.summary.count(PublishStatus::Failed),
        "publish finished"
    );
    outcome
}

/// Keep page ids the registry already knew for pages that succeeded this run
/// without reporting one.
///
/// Codes that did not succeed this run stay out; the registry is a full
/// overwrite.
pub fn carry_forward(
    mut entries: RegistryEntries,
    prior: Option<&RegistryEntries>,
) -> RegistryEntries {
    let Some(prior) = prior else {
        return entries;
    };
    for code in entries.links.keys() {
        if entries.page_ids.contains_key(code) {
            continue;
        }
        if let Some(id) = prior.page_ids.get(code) {
            entries.page_ids.insert(code.clone(), *id);
        }
    }
    entries
}
