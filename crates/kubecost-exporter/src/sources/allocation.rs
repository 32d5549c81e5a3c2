//! `scrape_allocation`: `/model/allocation` -> `assets_cost_cluster_allocation_total`.

use async_trait::async_trait;

use kubecost_core::error::Result;
use kubecost_core::labels;
use kubecost_core::model;

use super::params::{self, QueryParams};
use super::{ScrapeCtx, SeenSeries, Source};
use crate::client::ALLOCATION_PATH;
use crate::obs::metrics::{ALLOCATION_COST_TOTAL, ALLOCATION_COST_TOTAL_HELP};
use crate::obs::Sample;

pub const NAME: &str = "scrape_allocation";

pub struct ScrapeAllocation {
    offset_days: u32,
    params: QueryParams,
}

impl ScrapeAllocation {
    pub fn new(offset_days: u32, params: QueryParams) -> Self {
        Self {
            offset_days,
            params,
        }
    }
}

#[async_trait]
impl Source for ScrapeAllocation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> &'static str {
        "Scrapes the information about Cost Allocation API"
    }

    async fn scrape(&self, ctx: &ScrapeCtx) -> Result<()> {
        let base = ctx.params.clone().unwrap_or_else(|| self.params.clone());
        let query = params::with_window(base, self.offset_days, ctx.now);
        tracing::debug!(?query, "scrape_allocation params");

        let body = ctx.fetch.fetch(ALLOCATION_PATH, &query).await?;
        // empty `data` is an error here, unlike assets
        let decoded = model::decode_allocations(&body)?;

        for rejected in &decoded.rejected {
            ctx.reject(NAME, &rejected.key, &rejected.error);
        }

        let mut seen = SeenSeries::new();
        for alloc in &decoded.records {
            let labels = match labels::project_allocation(alloc).and_then(|l| seen.claim(l)) {
                Ok(labels) => labels,
                Err(e) => {
                    ctx.reject(NAME, &alloc.name, &e);
                    continue;
                }
            };
            ctx.sink
                .send(Sample::gauge(
                    ALLOCATION_COST_TOTAL,
                    ALLOCATION_COST_TOTAL_HELP,
                    labels,
                    alloc.total_cost,
                ))
                .await?;
        }
        Ok(())
    }
}
