use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;
use url::Url;

use kubecost_core::error::{KubecostError, Result};

use crate::sources::SOURCE_NAMES;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub kubecost: KubecostSection,

    #[serde(default)]
    pub web: WebSection,

    #[serde(default)]
    pub scrape: ScrapeSection,

    /// Per-source settings keyed by source name.
    #[serde(default)]
    pub collectors: BTreeMap<String, CollectorConfig>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            kubecost: KubecostSection::default(),
            web: WebSection::default(),
            scrape: ScrapeSection::default(),
            collectors: BTreeMap::new(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(KubecostError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.kubecost.validate()?;
        self.web.validate()?;
        self.scrape.validate()?;

        for (name, c) in &self.collectors {
            if !SOURCE_NAMES.contains(&name.as_str()) {
                return Err(KubecostError::Config(format!(
                    "collectors.{name}: unknown collector (known: {})",
                    SOURCE_NAMES.join(", ")
                )));
            }
            c.validate(name)?;
        }
        Ok(())
    }

    /// Settings for one source, defaults when it is not configured.
    pub fn collector(&self, name: &str) -> CollectorConfig {
        self.collectors.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KubecostSection {
    /// Base URL with scheme, e.g. `https://kubecost.example.com`.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub tls_insecure_skip_verify: bool,

    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for KubecostSection {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            tls_insecure_skip_verify: false,
            timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl KubecostSection {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(KubecostError::Config(
                "kubecost.base_url is required (or set KUBECOST_URL)".into(),
            ));
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| KubecostError::Config(format!("kubecost.base_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(KubecostError::Config(
                "kubecost.base_url must use http or https".into(),
            ));
        }
        if !(1000..=300000).contains(&self.timeout_ms) {
            return Err(KubecostError::Config(
                "kubecost.timeout_ms must be between 1000 and 300000".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(KubecostError::Config("kubecost.user_agent must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            telemetry_path: default_telemetry_path(),
        }
    }
}

impl WebSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            KubecostError::Config(format!("web.listen must be a valid SocketAddr: {e}"))
        })?;
        if !self.telemetry_path.starts_with('/') {
            return Err(KubecostError::Config(
                "web.telemetry_path must start with '/'".into(),
            ));
        }
        if matches!(self.telemetry_path.as_str(), "/" | "/healthz") {
            return Err(KubecostError::Config(format!(
                "web.telemetry_path must not shadow {}",
                self.telemetry_path
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapeSection {
    /// Deadline for one source within a collection cycle.
    #[serde(default = "default_scrape_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_scrape_timeout_ms(),
        }
    }
}

impl ScrapeSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=600000).contains(&self.timeout_ms) {
            return Err(KubecostError::Config(
                "scrape.timeout_ms must be between 1000 and 600000".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Days back from today for the query window (0 = today).
    #[serde(default = "default_offset_days")]
    pub offset_days: u32,

    /// Extra query parameters, `k=v`.
    #[serde(default)]
    pub params: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            offset_days: default_offset_days(),
            params: Vec::new(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.offset_days > 365 {
            return Err(KubecostError::Config(format!(
                "collectors.{name}.offset_days must be at most 365"
            )));
        }
        for p in &self.params {
            match p.split_once('=') {
                Some((k, _)) if !k.trim().is_empty() => {}
                _ => {
                    return Err(KubecostError::Config(format!(
                        "collectors.{name}.params: expected k=v, got {p:?}"
                    )))
                }
            }
        }
        Ok(())
    }
}

fn default_request_timeout_ms() -> u64 {
    30000
}
fn default_user_agent() -> String {
    format!("kubecost_exporter/{}", env!("CARGO_PKG_VERSION"))
}
fn default_listen() -> String {
    "0.0.0.0:9150".into()
}
fn default_telemetry_path() -> String {
    "/metrics".into()
}
fn default_scrape_timeout_ms() -> u64 {
    60000
}
fn default_enabled() -> bool {
    true
}
fn default_offset_days() -> u32 {
    1
}
