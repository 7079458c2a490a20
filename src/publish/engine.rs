//! Create-or-update resolution for one page.
//!
//! `publish` walks a small state machine:
//!
//! ```text
//! Unresolved ──► ById(id) ─────────┐
//!            ├─► BySlugFound(id) ──┼─► update ─► Updated | Failed
//!            └─► BySlugNotFound ───┴─► create ─► Created | Failed
//! ```
//!
//! A known id skips the lookup. Otherwise the slug is looked up first, so
//! repeating a publish finds the page the previous run created instead of
//! creating a second one. Remote errors and transport failures both end in
//! `Failed`; nothing is retried here.

use crate::catalog::{DisciplineCode, PageId};
use crate::publish::content::PageContent;
use crate::publish::transport::{HttpReply, PageRequest, PageStatus, PageTransport};
use crate::slug::slugify;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::{info, warn};

const CREATED: u16 = 201;
const OK: u16 = 200;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// What the caller already knows about the remote page.
pub struct PublishHint {
    /// Remote id from a prior registry or an explicit pin.
    pub page_id: Option<PageId>,
    /// Slug override; when absent the slug is derived from the title.
    pub slug: Option<String>,
    pub parent: Option<PageId>,
    /// Extra request fields passed through untouched.
    pub extra: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Created,
    Updated,
    Failed,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Created => "created",
            PublishStatus::Updated => "updated",
            PublishStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub code: Option<DisciplineCode>,
    pub title: String,
    pub status: PublishStatus,
    pub url: Option<String>,
    pub page_id: Option<PageId>,
    pub message: String,
}

impl PublishResult {
    pub fn failed(
        code: Option<DisciplineCode>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            title: title.into(),
            status: PublishStatus::Failed,
            url: None,
            page_id: None,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status != PublishStatus::Failed
    }
}

#[derive(Debug)]
enum Resolution {
    Unresolved,
    ById(PageId),
    BySlugFound(PageId),
    BySlugNotFound,
    Done(PublishResult),
}

pub struct PublishEngine<T> {
    transport: T,
}

impl<T: PageTransport> PublishEngine<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn publish(&self, content: &PageContent, hint: &PublishHint) -> PublishResult {
        let slug = hint
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&content.title));
        let request = PageRequest {
            title: content.title.clone(),
            content: content.body.clone(),
            status: PageStatus::Publish,
            slug: (!slug.is_empty()).then(|| slug.clone()),
            parent: hint.parent,
            extra: hint.extra.clone(),
        };

        let mut state = Resolution::Unresolved;
        loop {
            state = match state {
                Resolution::Unresolved => self.resolve(content, hint.page_id, &slug),
                Resolution::ById(id) | Resolution::BySlugFound(id) => {
                    Resolution::Done(self.update(content, id, &request))
                }
                Resolution::BySlugNotFound => Resolution::Done(self.create(content, &request)),
                Resolution::Done(result) => {
                    log_result(&result, &slug);
                    return result;
                }
            };
        }
    }

    fn resolve(&self, content: &PageContent, known: Option<PageId>, slug: &str) -> Resolution {
        if let Some(id) = known {
            return Resolution::ById(id);
        }
        if slug.is_empty() {
            return Resolution::Done(self.failure(content, "need id or slug"));
        }
        let reply = match self.transport.find_by_slug(slug) {
            Ok(reply) => reply,
            Err(err) => return Resolution::Done(self.failure(content, err.to_string())),
        };
        if reply.status != OK {
            return Resolution::Done(self.failure(
                content,
                format!("slug lookup failed: HTTP {} {}", reply.status, reply.body.trim()),
            ));
        }
        match reply.json() {
            Some(Value::Array(pages)) => match pages.first() {
                None => Resolution::BySlugNotFound,
                Some(page) => match page.get("id").and_then(Value::as_u64) {
                    Some(id) => Resolution::BySlugFound(PageId(id)),
                    None => Resolution::Done(
                        self.failure(content, "slug lookup returned a page without an id"),
                    ),
                },
            },
            _ => Resolution::Done(self.failure(
                content,
                format!("slug lookup returned unexpected body: {}", reply.body.trim()),
            )),
        }
    }

    fn update(&self, content: &PageContent, id: PageId, request: &PageRequest) -> PublishResult {
        match self.transport.update(id, request) {
            Ok(reply) if reply.status == OK => {
                self.success(content, PublishStatus::Updated, &reply, Some(id))
            }
            Ok(reply) => self.failure(
                content,
                format!("update of page {id} failed: HTTP {} {}", reply.status, reply.body.trim()),
            ),
            Err(err) => self.failure(content, err.to_string()),
        }
    }

    fn create(&self, content: &PageContent, request: &PageRequest) -> PublishResult {
        match self.transport.create(request) {
            Ok(reply) if reply.status == CREATED => {
                self.success(content, PublishStatus::Created, &reply, None)
            }
            Ok(reply) => self.failure(
                content,
                format!("create failed: HTTP {} {}", reply.status, reply.body.trim()),
            ),
            Err(err) => self.failure(content, err.to_string()),
        }
    }

    fn success(
        &self,
        content: &PageContent,
        status: PublishStatus,
        reply: &HttpReply,
        known: Option<PageId>,
    ) -> PublishResult {
        let body = reply.json();
        let url = body
            .as_ref()
            .and_then(|body| body.get("link"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let page_id = body
            .as_ref()
            .and_then(|body| body.get("id"))
            .and_then(Value::as_u64)
            .map(PageId)
            .or(known);
        let message = match (status, page_id) {
            (PublishStatus::Created, Some(id)) => format!("created page {id}"),
            (PublishStatus::Created, None) => "created page".to_string(),
            (_, Some(id)) => format!("updated page {id}"),
            (_, None) => "updated page".to_string(),
        };
        PublishResult {
            code: content.code.clone(),
            title: content.title.clone(),
            status,
            url,
            page_id,
            message,
        }
    }

    fn failure(&self, content: &PageContent, message: impl Into<String>) -> PublishResult {
        PublishResult::failed(content.code.clone(), content.title.clone(), message)
    }
}

fn log_result(result: &PublishResult, slug: &str) {
    let code = result.code.as_ref().map(|code| code.0.as_str()).unwrap_or("-");
    match result.status {
        PublishStatus::Failed => warn!(
            code,
            slug,
            status = %result.status,
            message = %result.message,
            "publish failed"
        ),
        _ => info!(
            code,
            slug,
            page_id = result.page_id.map(|id| id.0),
            status = %result.status,
            url = result.url.as_deref().unwrap_or(""),
            "page published"
        ),
    }
}
