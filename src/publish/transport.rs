//! Wire access to the CMS page collection.
//!
//! The engine talks to a `PageTransport` and interprets status codes itself;
//! a transport only moves bytes. `HttpTransport` is the real client, tests
//! substitute an in-memory one.

use crate::catalog::PageId;
use crate::config::CmsConfig;
use crate::error::TransportError;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Publish,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Body of a create or update request.
pub struct PageRequest {
    pub title: String,
    pub content: String,
    pub status: PageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<PageId>,
    /// Caller-supplied fields sent as-is alongside the ones above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Status and raw body of whatever the CMS answered.
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

pub trait PageTransport {
    /// List pages whose slug equals `slug`.
    fn find_by_slug(&self, slug: &str) -> Result<HttpReply, TransportError>;

    /// POST to the collection endpoint.
    fn create(&self, request: &PageRequest) -> Result<HttpReply, TransportError>;

    /// POST to the page's own endpoint.
    fn update(&self, id: PageId, request: &PageRequest) -> Result<HttpReply, TransportError>;
}

/// Blocking HTTP client for a WordPress-style pages collection.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &CmsConfig) -> Result<Self, TransportError> {
        let endpoint = Url::parse(config.endpoint.trim_end_matches('/'))
            .map_err(|err| TransportError(format!("invalid endpoint '{}': {err}", config.endpoint)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// The page's own endpoint: the id becomes the last path segment, any
    /// query on the collection endpoint is kept.
    fn page_url(&self, id: PageId) -> Result<Url, TransportError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TransportError(format!("endpoint '{}' cannot take a page id", self.endpoint))
            })?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<HttpReply, TransportError> {
        let request = match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        };
        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(status, bytes = body.len(), "cms reply");
        Ok(HttpReply { status, body })
    }
}

impl PageTransport for HttpTransport {
    fn find_by_slug(&self, slug: &str) -> Result<HttpReply, TransportError> {
        let url = Url::parse_with_params(self.endpoint.as_str(), &[("slug", slug)])
            .map_err(|err| TransportError(format!("building lookup url: {err}")))?;
        self.send(self.client.get(url))
    }

    fn create(&self, request: &PageRequest) -> Result<HttpReply, TransportError> {
        self.send(self.client.post(self.endpoint.clone()).json(request))
    }

    fn update(&self, id: PageId, request: &PageRequest) -> Result<HttpReply, TransportError> {
        let url = self.page_url(id)?;
        self.send(self.client.post(url).json(request))
    }
}
