//! Shared application state for the exporter.
//!
//! Built once at startup; request handlers only read from it. Metrics that
//! carry over between requests sit behind the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use kubecost_core::error::Result;

use crate::client::{Fetch, KubecostClient};
use crate::config::ExporterConfig;
use crate::obs::ExporterMetrics;
use crate::scrape::Orchestrator;
use crate::sources::{self, Source};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    sources: Vec<Arc<dyn Source>>,
    orchestrator: Orchestrator,
}

impl AppState {
    /// Build state with the real Kubecost client.
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let client = KubecostClient::new(&cfg.kubecost)?;
        tracing::info!(base = %client.base(), "kubecost api configured");
        Ok(Self::with_fetch(cfg, Arc::new(client)))
    }

    /// Build state around any [`Fetch`] implementation.
    pub fn with_fetch(cfg: ExporterConfig, fetch: Arc<dyn Fetch>) -> Self {
        let sources = sources::build_enabled(&cfg);
        Self::with_sources(cfg, fetch, sources)
    }

    /// Build state with an explicit source list instead of the built-ins.
    pub fn with_sources(
        cfg: ExporterConfig,
        fetch: Arc<dyn Fetch>,
        sources: Vec<Arc<dyn Source>>,
    ) -> Self {
        let orchestrator = Orchestrator::new(
            fetch,
            Arc::new(ExporterMetrics::default()),
            Duration::from_millis(cfg.scrape.timeout_ms),
        );
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                sources,
                orchestrator,
            }),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    /// Sources enabled in config, in registration order.
    pub fn sources(&self) -> &[Arc<dyn Source>] {
        &self.inner.sources
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    pub fn metrics(&self) -> &Arc<ExporterMetrics> {
        self.inner.orchestrator.metrics()
    }
}
