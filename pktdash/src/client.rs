//! HTTP client for the analyzer's three read endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::FetchError;
use crate::types::{PacketRecord, ProtocolDistribution, TimelineSeries, Validate};

pub const PACKETS_PATH: &str = "packets";
pub const TIMELINE_PATH: &str = "packet_timeline";
pub const DISTRIBUTION_PATH: &str = "protocol_summary_chart";

/// Something that can answer the three dashboard queries. Each call is one
/// request/response exchange with no retry.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<PacketRecord>, FetchError>;
    async fn fetch_timeline(&self) -> Result<TimelineSeries, FetchError>;
    async fn fetch_distribution(&self) -> Result<ProtocolDistribution, FetchError>;

    /// Shown in the status line.
    fn description(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base: with_trailing_slash(base),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path)
            .map_err(|e| FetchError::Transport(format!("bad endpoint {path}: {e}")))
    }

    // GET, check status, then decode + shape-check the body
    async fn get_json<T>(&self, path: &str) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(path)?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("GET /{path}: HTTP {status}")));
        }
        let body = resp.bytes().await?;
        let value: T = serde_json::from_slice(&body)
            .map_err(|e| FetchError::Decode(format!("/{path}: {e}")))?;
        value
            .validate()
            .map_err(|e| FetchError::Decode(format!("/{path}: {e}")))?;
        Ok(value)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_records(&self) -> Result<Vec<PacketRecord>, FetchError> {
        self.get_json(PACKETS_PATH).await
    }

    async fn fetch_timeline(&self) -> Result<TimelineSeries, FetchError> {
        self.get_json(TIMELINE_PATH).await
    }

    async fn fetch_distribution(&self) -> Result<ProtocolDistribution, FetchError> {
        self.get_json(DISTRIBUTION_PATH).await
    }

    fn description(&self) -> String {
        self.base().to_string()
    }
}

// Url::join replaces the last segment unless the base ends in '/'
fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let p = format!("{}/", base.path());
        base.set_path(&p);
    }
    base
}
