//! Upstream Kubecost API client.
//!
//! The transport is built once at startup from `kubecost.*` config, TLS
//! verification included, and is never mutated afterwards. Sources only see
//! the [`Fetch`] capability, which keeps them testable without a network.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use url::Url;

use kubecost_core::error::{KubecostError, Result};

use crate::config::KubecostSection;

pub const ASSETS_PATH: &str = "model/assets";
pub const ALLOCATION_PATH: &str = "model/allocation";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch a path relative to the API base, returning the raw body.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Bytes>;
}

pub struct KubecostClient {
    http: reqwest::Client,
    base: Url,
}

impl KubecostClient {
    pub fn new(cfg: &KubecostSection) -> Result<Self> {
        let base = normalize_base(&cfg.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if cfg.tls_insecure_skip_verify {
            tracing::warn!("tls certificate verification disabled for the kubecost api");
        }

        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .connect_timeout(CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(cfg.tls_insecure_skip_verify)
            .build()
            .map_err(|e| KubecostError::Config(format!("http client build failed: {e}")))?;

        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        endpoint(&self.base, path)
    }
}

#[async_trait]
impl Fetch for KubecostClient {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Bytes> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, params = query.len(), "kubecost request");

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| KubecostError::Scrape(format!("GET {path} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KubecostError::Scrape(format!("GET {path} returned {status}")));
        }

        resp.bytes()
            .await
            .map_err(|e| KubecostError::Scrape(format!("GET {path} body read failed: {e}")))
    }
}

/// Parse the base URL and make its path a directory so that relative joins
/// keep any prefix (`https://host/kubecost` -> `https://host/kubecost/`).
pub fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| KubecostError::Config(format!("invalid kubecost base url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(KubecostError::Config(format!(
            "unsupported scheme in kubecost base url: {}",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| KubecostError::Internal(format!("bad endpoint {path}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_bare_host() {
        let base = normalize_base("https://kubecost.example.com").unwrap();
        assert_eq!(
            endpoint(&base, ASSETS_PATH).unwrap().as_str(),
            "https://kubecost.example.com/model/assets"
        );
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let base = normalize_base("http://gateway.local:9090/kubecost?x=1").unwrap();
        assert_eq!(
            endpoint(&base, "/model/allocation").unwrap().as_str(),
            "http://gateway.local:9090/kubecost/model/allocation"
        );
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        assert!(normalize_base("ftp://kubecost.example.com").is_err());
        assert!(normalize_base("not a url").is_err());
    }
}
