use std::time::Duration;

use anyhow::Context;
use reqwest::Url;

use crate::decode::{self, Decoded, envelope};
use crate::models::{
    AddFileResponse, ApiResponse, AuthResponse, CategoriesResponse, HistoryResponse,
    ItemFilesResponse, QueueResponse, ScriptsResponse, ServerStatsResponse, VersionResponse,
    WarningsResponse,
};

#[derive(Clone, Debug)]
pub struct SabClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl SabClient {
    /// Create a new client with the given base URL (e.g. "http://localhost:8080/sabnzbd").
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating SabClient");
        Ok(SabClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Return a client that sends the given API key with every call.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build the `/api` URL for a mode. Does not perform a request.
    pub fn api_url(&self, mode: &str, params: &[(&str, &str)]) -> anyhow::Result<Url> {
        let mut q = vec![("mode", mode), ("output", "json")];
        if let Some(key) = self.api_key.as_deref() {
            q.push(("apikey", key));
        }
        q.extend_from_slice(params);
        let url = format!("{}/api", self.base_url);
        Url::parse_with_params(&url, &q).with_context(|| format!("invalid base URL: {}", url))
    }

    async fn call(&self, mode: &str, params: &[(&str, &str)]) -> anyhow::Result<Vec<u8>> {
        let url = self.api_url(mode, params)?;
        tracing::debug!(%mode, "GET api");
        let resp = self.client.get(url).send().await?;
        let status = resp.error_for_status()?;
        let body = status.bytes().await?;
        Ok(body.to_vec())
    }

    async fn call_flat<T>(&self, mode: &str, params: &[(&str, &str)]) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned + ApiResponse,
    {
        let body = self.call(mode, params).await?;
        match decode::decode::<T>(&body) {
            Ok(parsed) => Ok(parsed.into_result()?),
            Err(e) => {
                let snippet = String::from_utf8_lossy(&body[..body.len().min(2000)]);
                tracing::error!(
                    error = %e,
                    %mode,
                    body_snippet = %snippet,
                    "failed to parse response"
                );
                Err(e.into())
            }
        }
    }

    async fn call_enveloped<T>(
        &self,
        mode: &str,
        params: &[(&str, &str)],
    ) -> anyhow::Result<Decoded<T>>
    where
        T: envelope::Enveloped + ApiResponse,
    {
        let body = self.call(mode, params).await?;
        let decoded = envelope::decode::<T>(&body)
            .with_context(|| format!("failed to decode {} response", mode))?;
        if let Some(message) = decoded.value.error_message() {
            anyhow::bail!(crate::error::ApiError::new(message));
        }
        Ok(decoded)
    }

    /// GET mode=version (no auth required)
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_version(&self) -> anyhow::Result<VersionResponse> {
        self.call_flat("version", &[]).await
    }

    /// GET mode=auth
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_auth(&self) -> anyhow::Result<AuthResponse> {
        self.call_flat("auth", &[]).await
    }

    /// GET mode=queue
    /// The value may be partial; check `Decoded::warning`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_queue(
        &self,
        start: Option<u32>,
        limit: Option<u32>,
    ) -> anyhow::Result<Decoded<QueueResponse>> {
        let (start, limit) = paging(start, limit);
        self.call_enveloped("queue", &paging_params(&start, &limit)).await
    }

    /// GET mode=history
    /// The value may be partial; check `Decoded::warning`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_history(
        &self,
        start: Option<u32>,
        limit: Option<u32>,
    ) -> anyhow::Result<Decoded<HistoryResponse>> {
        let (start, limit) = paging(start, limit);
        self.call_enveloped("history", &paging_params(&start, &limit)).await
    }

    /// GET mode=server_stats
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_server_stats(&self) -> anyhow::Result<ServerStatsResponse> {
        self.call_flat("server_stats", &[]).await
    }

    /// GET mode=warnings
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_warnings(&self) -> anyhow::Result<WarningsResponse> {
        self.call_flat("warnings", &[]).await
    }

    /// GET mode=get_cats
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_categories(&self) -> anyhow::Result<CategoriesResponse> {
        self.call_flat("get_cats", &[]).await
    }

    /// GET mode=get_scripts
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_scripts(&self) -> anyhow::Result<ScriptsResponse> {
        self.call_flat("get_scripts", &[]).await
    }

    /// GET mode=get_files&value={nzo_id}
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_files(&self, nzo_id: &str) -> anyhow::Result<ItemFilesResponse> {
        self.call_flat("get_files", &[("value", nzo_id)]).await
    }

    /// GET mode=addurl&name={url}
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn add_url(
        &self,
        url: &str,
        category: Option<&str>,
    ) -> anyhow::Result<AddFileResponse> {
        let mut q = vec![("name", url)];
        if let Some(cat) = category {
            q.push(("cat", cat));
        }
        self.call_flat("addurl", &q).await
    }
}

fn paging(start: Option<u32>, limit: Option<u32>) -> (Option<String>, Option<String>) {
    (start.map(|s| s.to_string()), limit.map(|l| l.to_string()))
}

fn paging_params<'a>(
    start: &'a Option<String>,
    limit: &'a Option<String>,
) -> Vec<(&'a str, &'a str)> {
    let mut q = vec![];
    if let Some(start) = start {
        q.push(("start", start.as_str()));
    }
    if let Some(limit) = limit {
        q.push(("limit", limit.as_str()));
    }
    q
}
