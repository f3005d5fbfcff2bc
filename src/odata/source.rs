//! Upstream page source backed by the HTTP client

use super::types::{PageSource, PageTarget, RawPage};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;

/// Fetches pages from the upstream list service over HTTP
#[derive(Debug)]
pub struct UpstreamClient {
    http: HttpClient,
}

impl UpstreamClient {
    /// Wrap an HTTP client
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PageSource for UpstreamClient {
    fn ensure_configured(&self) -> Result<()> {
        match self.http.authenticator() {
            Some(auth) => auth.config().validate(),
            None => Ok(()),
        }
    }

    async fn fetch(&self, target: &PageTarget) -> Result<RawPage> {
        let response = self.http.get(target.as_str()).await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::Http)?;
        Ok(RawPage::new(status, body))
    }
}
