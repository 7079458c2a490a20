//! Persisted discipline-code → published-URL table for one dataset identity.
//!
//! The registry is the only artifact shared between a publish run and a
//! later rewrite run. Each file carries the identity it was recorded under;
//! `record` always replaces the whole file and refuses to touch a file that
//! belongs to a different identity, and `lookup` refuses to hand out entries
//! recorded for another identity.

use crate::catalog::repository::write_atomically;
use crate::catalog::{DatasetIdentity, DisciplineCode, PageId};
use crate::error::RegistryError;
use crate::slug::slugify;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// What a publish run learned about its pages.
pub struct RegistryEntries {
    pub links: BTreeMap<DisciplineCode, String>,
    /// Remote ids, used to pin updates on the next run.
    pub page_ids: BTreeMap<DisciplineCode, PageId>,
}

impl RegistryEntries {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn link(&self, code: &DisciplineCode) -> Option<&str> {
        self.links.get(code).map(String::as_str)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(deserialize_with = "scalar_text")]
    year: String,
    #[serde(deserialize_with = "scalar_text")]
    degree: String,
    #[serde(default)]
    links: BTreeMap<DisciplineCode, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    page_ids: BTreeMap<DisciplineCode, PageId>,
}

impl RegistryDocument {
    fn identity(&self) -> DatasetIdentity {
        DatasetIdentity::new(&self.degree, &self.year)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A registry file on disk.
pub struct LinkRegistry {
    path: PathBuf,
}

impl LinkRegistry {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional file for `identity` inside `dir`.
    pub fn in_dir(dir: &Path, identity: &DatasetIdentity) -> Self {
        Self::at(default_path(dir, identity))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the registry with `entries` recorded under `identity`.
    ///
    /// Codes missing from `entries` are dropped. A file already holding a
    /// different identity is left untouched and reported as a mismatch.
    pub fn record(
        &self,
        identity: &DatasetIdentity,
        entries: &RegistryEntries,
    ) -> Result<(), RegistryError> {
        match self.read() {
            Ok(existing) if existing.identity() != *identity => {
                return Err(RegistryError::IdentityMismatch {
                    path: self.path.clone(),
                    stored: existing.identity(),
                    requested: identity.clone(),
                });
            }
            Ok(_) | Err(RegistryError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }

        let document = RegistryDocument {
            year: identity.year.clone(),
            degree: identity.degree.clone(),
            links: entries.links.clone(),
            page_ids: entries.page_ids.clone(),
        };
        let mut text =
            serde_json::to_string_pretty(&document).map_err(|err| RegistryError::Malformed {
                path: self.path.clone(),
                detail: err.to_string(),
            })?;
        text.push('\n');
        write_atomically(&self.path, text.as_bytes()).map_err(|source| RegistryError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(
            path = %self.path.display(),
            identity = %identity,
            links = entries.links.len(),
            "link registry written"
        );
        Ok(())
    }

    /// Entries recorded for `identity`.
    pub fn lookup(&self, identity: &DatasetIdentity) -> Result<RegistryEntries, RegistryError> {
        let document = self.read()?;
        let stored = document.identity();
        if stored != *identity {
            return Err(RegistryError::IdentityMismatch {
                path: self.path.clone(),
                stored,
                requested: identity.clone(),
            });
        }
        Ok(RegistryEntries {
            links: document.links,
            page_ids: document.page_ids,
        })
    }

    fn read(&self) -> Result<RegistryDocument, RegistryError> {
        let text = fs::read_to_string(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => RegistryError::NotFound(self.path.clone()),
            _ => RegistryError::Io {
                path: self.path.clone(),
                source,
            },
        })?;
        serde_json::from_str(&text).map_err(|err| RegistryError::Malformed {
            path: self.path.clone(),
            detail: err.to_string(),
        })
    }
}

/// `<dir>/links_<slug(degree)>_<slug(year)>.json`
pub fn default_path(dir: &Path, identity: &DatasetIdentity) -> PathBuf {
    dir.join(format!(
        "links_{}_{}.json",
        slugify(&identity.degree),
        slugify(&identity.year)
    ))
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Text::deserialize(deserializer)? {
        Text::Text(text) => text,
        Text::Number(number) => number.to_string(),
    })
}
