//! Data sources scraped in each collection cycle.
//!
//! A [`Source`] builds its own query (rolling window included), fetches one
//! upstream endpoint, decodes the response, and hands samples to the cycle's
//! sink. Sources are registered by name; the name drives config
//! (`collectors.<name>`), per-request filtering (`collect[]=<name>`), and the
//! `collect.<name>` metric label.

pub mod allocation;
pub mod assets;
pub mod params;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kubecost_core::error::{KubecostError, Result};
use kubecost_core::labels::LabelSet;

use crate::client::Fetch;
use crate::config::ExporterConfig;
use crate::obs::{ExporterMetrics, MetricSink};

pub use allocation::ScrapeAllocation;
pub use assets::ScrapeAssets;
pub use params::QueryParams;

/// Names of the built-in sources.
pub const SOURCE_NAMES: [&str; 2] = [assets::NAME, allocation::NAME];

/// Everything one source task needs for one cycle.
pub struct ScrapeCtx {
    pub fetch: Arc<dyn Fetch>,
    /// Per-request parameters replacing the source's configured ones.
    pub params: Option<QueryParams>,
    pub sink: MetricSink,
    pub metrics: Arc<ExporterMetrics>,
    /// Cycle start, the reference point for query windows.
    pub now: DateTime<Utc>,
}

impl ScrapeCtx {
    /// Skip one record: log it and count it against the source.
    pub fn reject(&self, source: &str, key: &str, error: &KubecostError) {
        tracing::warn!(
            source,
            key,
            kind = error.kind().as_str(),
            error = %error,
            "record skipped"
        );
        let label = collector_label(source);
        self.metrics
            .rejected_records
            .inc(&[("collector", label.as_str())]);
    }
}

/// Label sets one source already exported in the current cycle.
///
/// A second record projecting to the same label set would be a duplicate
/// sample of one series, so it is refused.
#[derive(Default)]
pub struct SeenSeries {
    seen: HashSet<LabelSet>,
}

impl SeenSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the label set back if it is new in this cycle.
    pub fn claim(&mut self, labels: LabelSet) -> Result<LabelSet> {
        if self.seen.contains(&labels) {
            let rendered: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
            return Err(KubecostError::Label(format!(
                "duplicate series {{{}}}",
                rendered.join(",")
            )));
        }
        self.seen.insert(labels.clone());
        Ok(labels)
    }
}

#[async_trait]
pub trait Source: Send + Sync {
    /// Unique name, e.g. `scrape_assets`.
    fn name(&self) -> &'static str;
    /// One-line description of what the source collects.
    fn describe(&self) -> &'static str;
    async fn scrape(&self, ctx: &ScrapeCtx) -> Result<()>;
}

/// Label value used for a source's duration and error metrics.
pub fn collector_label(name: &str) -> String {
    format!("collect.{name}")
}

/// Instantiate every built-in source enabled in `cfg`, in registration order.
pub fn build_enabled(cfg: &ExporterConfig) -> Vec<Arc<dyn Source>> {
    let mut out: Vec<Arc<dyn Source>> = Vec::new();

    let c = cfg.collector(assets::NAME);
    if c.enabled {
        out.push(Arc::new(ScrapeAssets::new(c.offset_days, params::parse_pairs(&c.params))));
    }

    let c = cfg.collector(allocation::NAME);
    if c.enabled {
        out.push(Arc::new(ScrapeAllocation::new(
            c.offset_days,
            params::parse_pairs(&c.params),
        )));
    }

    out
}
