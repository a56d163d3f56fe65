use std::num::NonZeroU32;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use shared::{
    domain::{ChildId, RawChild},
    protocol::{ChildrenPage, TOTAL_COUNT_HEADER},
};
use tracing::debug;
use url::Url;

use crate::config::Settings;

/// Remote source of registered children.
#[async_trait]
pub trait ChildrenBackend: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<ChildrenPage>;
    async fn delete_child(&self, id: &ChildId, page: u32) -> Result<()>;
}

pub struct MissingChildrenBackend;

#[async_trait]
impl ChildrenBackend for MissingChildrenBackend {
    async fn fetch_page(&self, page: u32) -> Result<ChildrenPage> {
        Err(anyhow!("children backend unavailable for page {page}"))
    }

    async fn delete_child(&self, id: &ChildId, _page: u32) -> Result<()> {
        Err(anyhow!("children backend unavailable; cannot delete child {id}"))
    }
}

#[derive(Serialize)]
struct PageQuery {
    #[serde(rename = "_page")]
    page: u32,
    #[serde(rename = "_limit")]
    limit: u32,
}

/// json-server style REST source: paged `GET` with an `X-Total-Count` header
/// and `DELETE` by id.
pub struct HttpChildrenBackend {
    http: Client,
    collection_url: Url,
    children_per_page: NonZeroU32,
}

impl HttpChildrenBackend {
    pub fn new(
        backend_url: &str,
        resource_path: &str,
        children_per_page: NonZeroU32,
    ) -> Result<Self> {
        let mut base = Url::parse(backend_url)
            .with_context(|| format!("invalid backend url: {backend_url}"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let collection_url = base
            .join(resource_path.trim_matches('/'))
            .with_context(|| format!("invalid resource path: {resource_path}"))?;
        Ok(Self {
            http: Client::new(),
            collection_url,
            children_per_page,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.backend_url,
            &settings.resource_path,
            settings.children_per_page,
        )
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    fn child_url(&self, id: &ChildId) -> Result<Url> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("backend url cannot carry path segments"))?
            .push(id.as_str());
        Ok(url)
    }
}

fn parse_total_count(headers: &reqwest::header::HeaderMap) -> Result<u64> {
    let Some(raw) = headers.get(TOTAL_COUNT_HEADER) else {
        return Ok(0);
    };
    let raw = raw
        .to_str()
        .with_context(|| format!("{TOTAL_COUNT_HEADER} header is not ASCII"))?;
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("malformed {TOTAL_COUNT_HEADER} header: {raw:?}"))
}

#[async_trait]
impl ChildrenBackend for HttpChildrenBackend {
    async fn fetch_page(&self, page: u32) -> Result<ChildrenPage> {
        let response = self
            .http
            .get(self.collection_url.clone())
            .query(&PageQuery {
                page,
                limit: self.children_per_page.get(),
            })
            .send()
            .await?
            .error_for_status()?;

        let total_count = parse_total_count(response.headers())?;
        let status = response.status();
        let body = response.bytes().await?;
        let children: Vec<RawChild> = if body.iter().all(u8::is_ascii_whitespace)
            || status == StatusCode::NO_CONTENT
        {
            Vec::new()
        } else {
            serde_json::from_slice(&body)
                .with_context(|| format!("invalid children payload for page {page}"))?
        };

        debug!(page, total_count, received = children.len(), "fetched children page");
        Ok(ChildrenPage::new(children, total_count))
    }

    async fn delete_child(&self, id: &ChildId, page: u32) -> Result<()> {
        self.http
            .delete(self.child_url(id)?)
            .send()
            .await?
            .error_for_status()?;
        debug!(child_id = %id, page, "deleted child");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
