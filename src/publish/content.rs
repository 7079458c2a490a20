//! Rendered page content handed to the sync engine.
//!
//! Rendering itself happens elsewhere; this module only reads finished HTML
//! and attaches the discipline identity the engine and registry need.

use crate::catalog::{Dataset, DisciplineCode};
use crate::error::RepositoryError;
use crate::slug::slugify;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
/// One page ready to publish.
pub struct PageContent {
    /// Discipline the page belongs to; `None` for non-discipline pages such
    /// as the index.
    pub code: Option<DisciplineCode>,
    pub title: String,
    pub body: String,
}

impl PageContent {
    pub fn new(
        code: Option<DisciplineCode>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            code,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Slug derived from the title.
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Label used in logs and summaries: the code when known, else the title.
    pub fn label(&self) -> String {
        match &self.code {
            Some(code) => code.0.clone(),
            None => self.title.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A source that could not become a page. The batch reports it as failed.
pub struct ContentIssue {
    pub code: Option<DisciplineCode>,
    pub source: PathBuf,
    pub message: String,
}

/// Anything that can enumerate pages for a publish run.
pub trait ContentProvider {
    fn pages(&self) -> Result<Vec<Result<PageContent, ContentIssue>>, RepositoryError>;
}

/// Reads `*.html` files rendered per discipline (`ЗО_01.html`) from a
/// directory and titles them from the dataset.
pub struct DirectoryContentProvider<'a> {
    dir: PathBuf,
    dataset: &'a Dataset,
}

const INDEX_FILE: &str = "index.html";

impl<'a> DirectoryContentProvider<'a> {
    pub fn new(dir: impl Into<PathBuf>, dataset: &'a Dataset) -> Self {
        Self {
            dir: dir.into(),
            dataset,
        }
    }

    fn page_from_file(&self, path: &Path) -> Result<PageContent, ContentIssue> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        let code = DisciplineCode::from_file_stem(stem);
        let issue = |message: String| ContentIssue {
            code: Some(code.clone()),
            source: path.to_path_buf(),
            message,
        };

        let discipline = self
            .dataset
            .discipline(&code)
            .ok_or_else(|| issue(format!("discipline {code} is not in the dataset")))?;
        let body = fs::read_to_string(path)
            .map_err(|err| issue(format!("reading {}: {err}", path.display())))?;

        Ok(PageContent::new(
            Some(code.clone()),
            format!("{code}: {}", discipline.name),
            body,
        ))
    }
}

impl ContentProvider for DirectoryContentProvider<'_> {
    fn pages(&self) -> Result<Vec<Result<PageContent, ContentIssue>>, RepositoryError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| match source.kind() {
            ErrorKind::NotFound => RepositoryError::NotFound(self.dir.clone()),
            _ => RepositoryError::Io {
                path: self.dir.clone(),
                source,
            },
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RepositoryError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_html = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
            let is_index = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.eq_ignore_ascii_case(INDEX_FILE));
            if path.is_file() && is_html && !is_index {
                files.push(path);
            }
        }
        files.sort();

        Ok(files.iter().map(|path| self.page_from_file(path)).collect())
    }
}
