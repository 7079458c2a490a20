use anyhow::{Context, Result, bail};
use curricula::PageId;
use curricula::error::TransportError;
use curricula::publish::{HttpReply, PageRequest, PageTransport};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Bachelor 2024 dataset: three disciplines (one elective), two of them
/// mapped.
pub const BACHELOR_2024: &str = r#"
metadata:
  year: 2024
  degree: Bachelor
  page_id: 100
  faculty: Physics and Technology
disciplines:
  A 01: Intro to Physics
  A 02:
    name: Linear Algebra
    credits: 5
    control: Exam
elevative_disciplines:
  B 01: Astronomy
competencies:
  C1: Abstract thinking
  C2: Applying knowledge
program_results:
  R1: Know classical mechanics
mappings:
  A 01:
    competencies: [C1]
    program_results: [R1]
  B 01:
    competencies: [C2]
    program_results: []
"#;

pub fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Rendered page directory with one file per given code.
pub fn write_pages(dir: &Path, codes: &[&str]) -> Result<PathBuf> {
    let pages = dir.join("disciplines");
    fs::create_dir_all(&pages)?;
    for code in codes {
        let stem = code.replace(' ', "_");
        fs::write(
            pages.join(format!("{stem}.html")),
            format!("<h1>{code}</h1>"),
        )?;
    }
    Ok(pages)
}

pub fn binary(name: &str) -> PathBuf {
    match name {
        "curriculum" => PathBuf::from(env!("CARGO_BIN_EXE_curriculum")),
        "rewrite-index" => PathBuf::from(env!("CARGO_BIN_EXE_rewrite-index")),
        "publish-pages" => PathBuf::from(env!("CARGO_BIN_EXE_publish-pages")),
        other => panic!("no binary named {other}"),
    }
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RemotePage {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub parent: Option<u64>,
    pub status: String,
}

#[derive(Default)]
struct CmsState {
    pages: BTreeMap<u64, RemotePage>,
    next_id: u64,
    rejected_slugs: BTreeSet<String>,
    offline: bool,
    log: Vec<String>,
}

/// In-memory pages collection that answers like the real endpoint.
#[derive(Default)]
pub struct FakeCms {
    state: RefCell<CmsState>,
}

impl FakeCms {
    pub fn new() -> Self {
        let cms = Self::default();
        cms.state.borrow_mut().next_id = 1;
        cms
    }

    /// Creates and updates carrying this slug get HTTP 500.
    pub fn reject_slug(&self, slug: &str) {
        self.state
            .borrow_mut()
            .rejected_slugs
            .insert(slug.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    pub fn pages(&self) -> Vec<RemotePage> {
        self.state.borrow().pages.values().cloned().collect()
    }

    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    fn link(slug: &str) -> String {
        format!("https://cms.test/{slug}/")
    }

    fn guard(&self, entry: String) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.log.push(entry);
        if state.offline {
            return Err(TransportError("connection refused".into()));
        }
        Ok(())
    }
}

fn field(request: &Value, name: &str) -> String {
    request[name].as_str().unwrap_or_default().to_string()
}

impl PageTransport for FakeCms {
    fn find_by_slug(&self, slug: &str) -> Result<HttpReply, TransportError> {
        self.guard(format!("find {slug}"))?;
        let state = self.state.borrow();
        let matches: Vec<Value> = state
            .pages
            .values()
            .filter(|page| page.slug == slug)
            .map(|page| json!({"id": page.id, "slug": page.slug, "link": Self::link(&page.slug)}))
            .collect();
        Ok(HttpReply::new(200, Value::Array(matches).to_string()))
    }

    fn create(&self, request: &PageRequest) -> Result<HttpReply, TransportError> {
        let body = serde_json::to_value(request).map_err(|err| TransportError(err.to_string()))?;
        let slug = field(&body, "slug");
        self.guard(format!("create {slug}"))?;
        let mut state = self.state.borrow_mut();
        if state.rejected_slugs.contains(&slug) {
            return Ok(HttpReply::new(500, r#"{"code":"internal_error"}"#));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.pages.insert(
            id,
            RemotePage {
                id,
                slug: slug.clone(),
                title: field(&body, "title"),
                content: field(&body, "content"),
                parent: body["parent"].as_u64(),
                status: field(&body, "status"),
            },
        );
        Ok(HttpReply::new(
            201,
            json!({"id": id, "link": Self::link(&slug)}).to_string(),
        ))
    }

    fn update(&self, id: PageId, request: &PageRequest) -> Result<HttpReply, TransportError> {
        let body = serde_json::to_value(request).map_err(|err| TransportError(err.to_string()))?;
        self.guard(format!("update {id}"))?;
        let mut state = self.state.borrow_mut();
        let slug = field(&body, "slug");
        if state.rejected_slugs.contains(&slug) {
            return Ok(HttpReply::new(500, r#"{"code":"internal_error"}"#));
        }
        let Some(page) = state.pages.get_mut(&id.0) else {
            return Ok(HttpReply::new(
                404,
                r#"{"code":"rest_post_invalid_id","message":"Invalid post ID."}"#,
            ));
        };
        if !slug.is_empty() {
            page.slug = slug;
        }
        page.title = field(&body, "title");
        page.content = field(&body, "content");
        page.status = field(&body, "status");
        if let Some(parent) = body["parent"].as_u64() {
            page.parent = Some(parent);
        }
        Ok(HttpReply::new(
            200,
            json!({"id": page.id, "link": Self::link(&page.slug)}).to_string(),
        ))
    }
}
