//! HTTP transport shared by the catalog adapters.

use std::time::Duration;

use tracing::debug;

use crate::{MetadataConfig, MetadataError};

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    catalog: &'static str,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(catalog: &'static str, config: &MetadataConfig) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MetadataError::SourceUnavailable(format!("{catalog}: http client: {e}")))?;
        Ok(Self { catalog, client })
    }

    /// GET `url` and return the body as text.
    ///
    /// 404 maps to `NotFound`; every other failure maps to
    /// `SourceUnavailable`.
    pub async fn fetch_text(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, MetadataError> {
        debug!(catalog = self.catalog, url = %url, ?params, "catalog request");

        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound);
        }

        if !resp.status().is_success() {
            return Err(MetadataError::SourceUnavailable(format!(
                "{} returned {}",
                self.catalog,
                resp.status()
            )));
        }

        resp.text().await.map_err(|e| self.unavailable(e))
    }

    /// GET `url` and decode the body as JSON.
    pub async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, MetadataError> {
        let body = self.fetch_text(url, params).await?;
        serde_json::from_str(&body)
            .map_err(|e| MetadataError::MalformedResponse(format!("{}: parse JSON: {e}", self.catalog)))
    }

    fn unavailable(&self, err: reqwest::Error) -> MetadataError {
        MetadataError::SourceUnavailable(format!("{}: {err}", self.catalog))
    }
}

/// Append `segments` to `base` as percent-encoded path segments.
///
/// A segment cannot add path components, a query or a fragment. Empty, `.`
/// and `..` segments name nothing and yield `NotFound`.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<String, MetadataError> {
    if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
        return Err(MetadataError::NotFound);
    }
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| MetadataError::SourceUnavailable(format!("invalid base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| MetadataError::SourceUnavailable(format!("invalid base url {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
