//! `scrape_assets`: `/model/assets` -> `assets_cost_total`.

use async_trait::async_trait;

use kubecost_core::error::Result;
use kubecost_core::labels;
use kubecost_core::model;

use super::params::{self, QueryParams};
use super::{ScrapeCtx, SeenSeries, Source};
use crate::client::ASSETS_PATH;
use crate::obs::metrics::{COST_TOTAL, COST_TOTAL_HELP};
use crate::obs::Sample;

pub const NAME: &str = "scrape_assets";

pub struct ScrapeAssets {
    offset_days: u32,
    params: QueryParams,
}

impl ScrapeAssets {
    pub fn new(offset_days: u32, params: QueryParams) -> Self {
        Self {
            offset_days,
            params,
        }
    }
}

#[async_trait]
impl Source for ScrapeAssets {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> &'static str {
        "Scrapes the information about Assets API"
    }

    async fn scrape(&self, ctx: &ScrapeCtx) -> Result<()> {
        let base = ctx.params.clone().unwrap_or_else(|| self.params.clone());
        let query = params::with_window(base, self.offset_days, ctx.now);
        tracing::debug!(?query, "scrape_assets params");

        let body = ctx.fetch.fetch(ASSETS_PATH, &query).await?;
        let decoded = model::decode_slice(&body)?;

        for rejected in &decoded.rejected {
            ctx.reject(NAME, &rejected.key, &rejected.error);
        }

        // zero assets is a valid answer
        let mut seen = SeenSeries::new();
        let mut exported = 0usize;
        for (key, record) in decoded.keyed() {
            let labels = match labels::project(record).and_then(|l| seen.claim(l)) {
                Ok(labels) => labels,
                Err(e) => {
                    ctx.reject(NAME, key, &e);
                    continue;
                }
            };
            ctx.sink
                .send(Sample::gauge(COST_TOTAL, COST_TOTAL_HELP, labels, record.total_cost()))
                .await?;
            exported += 1;
        }

        tracing::debug!(exported, rejected = decoded.rejected.len(), "scrape_assets done");
        Ok(())
    }
}
