//! Points an index document's per-discipline links at published pages.
//!
//! The index is generated with relative hrefs named after discipline files
//! (`href="ЗО_01.html"`). Rewriting swaps each for the registry URL of that
//! code, or `#` when the code was never published. The registry must have
//! been recorded for the same dataset identity; otherwise nothing changes.

use crate::catalog::repository::write_atomically;
use crate::catalog::{DatasetIdentity, DisciplineCode};
use crate::error::RegistryError;
use crate::registry::LinkRegistry;
use anyhow::Context;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Short uppercase prefix, space or underscore, two digits, optional
/// decimal suffix, document extension.
pub const DEFAULT_LINK_PATTERN: &str =
    r#"href="(\p{Lu}{1,3}[ _]\d{2}(?:\.\d+)?)\.(?:html?|pdf|docx?)""#;

const PLACEHOLDER: &str = "#";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub document: String,
    /// Codes replaced with a registry URL, in document order.
    pub substituted: Vec<DisciplineCode>,
    /// Codes replaced with the placeholder, in document order.
    pub unresolved: Vec<DisciplineCode>,
}

#[derive(Clone, Debug)]
pub struct IndexRewriter {
    pattern: Regex,
}

impl IndexRewriter {
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_pattern(DEFAULT_LINK_PATTERN)
    }

    /// Custom href pattern; capture group 1 must be the discipline code.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Rewrite `document` with the links `registry` holds for `identity`.
    ///
    /// A registry recorded for another identity aborts with
    /// `RegistryError::IdentityMismatch` before any substitution.
    pub fn rewrite(
        &self,
        document: &str,
        identity: &DatasetIdentity,
        registry: &LinkRegistry,
    ) -> Result<RewriteOutcome, RegistryError> {
        let entries = registry.lookup(identity)?;
        let mut substituted = Vec::new();
        let mut unresolved = Vec::new();

        let rewritten = self.pattern.replace_all(document, |caps: &Captures| {
            let code = DisciplineCode::from_file_stem(&caps[1]);
            let href = match entries.link(&code) {
                Some(url) => {
                    substituted.push(code);
                    url.to_string()
                }
                None => {
                    unresolved.push(code);
                    PLACEHOLDER.to_string()
                }
            };
            format!(r#"href="{href}""#)
        });

        Ok(RewriteOutcome {
            document: rewritten.into_owned(),
            substituted,
            unresolved,
        })
    }

    /// Rewrite an index file in place (or into `output` when given).
    pub fn rewrite_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        identity: &DatasetIdentity,
        registry: &LinkRegistry,
    ) -> anyhow::Result<RewriteOutcome> {
        let document = fs::read_to_string(input)
            .with_context(|| format!("reading index document {}", input.display()))?;
        let outcome = match self.rewrite(&document, identity, registry) {
            Ok(outcome) => outcome,
            Err(err @ RegistryError::IdentityMismatch { .. }) => {
                warn!(input = %input.display(), "registry identity mismatch; index left untouched");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let destination = output.unwrap_or(input);
        write_atomically(destination, outcome.document.as_bytes())
            .with_context(|| format!("writing {}", destination.display()))?;
        info!(
            output = %destination.display(),
            substituted = outcome.substituted.len(),
            unresolved = outcome.unresolved.len(),
            "index links rewritten"
        );
        Ok(outcome)
    }
}
