//! One collection cycle.
//!
//! Each planned source runs as its own task inside a `JoinSet`; all tasks
//! write to one bounded [`MetricSink`] drained here. A source failure
//! (error, timeout, panic) is recorded and never stops the others. Dropping
//! the cycle future drops the set, which aborts whatever is still running.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::FutureExt;
use tokio::task::JoinSet;
use tracing::Instrument;

use kubecost_core::error::{KubecostError, Result};
use kubecost_core::labels::LabelSet;

use crate::client::Fetch;
use crate::obs::metrics::{COLLECTOR_DURATION, COLLECTOR_DURATION_HELP};
use crate::obs::{ExporterMetrics, MetricSink, Sample};
use crate::sources::{collector_label, ScrapeCtx};

use super::plan::PlannedSource;

const SINK_CAPACITY: usize = 1024;

/// How one source finished.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: &'static str,
    pub elapsed: Duration,
    pub result: Result<()>,
}

pub struct Orchestrator {
    fetch: Arc<dyn Fetch>,
    metrics: Arc<ExporterMetrics>,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(fetch: Arc<dyn Fetch>, metrics: Arc<ExporterMetrics>, timeout: Duration) -> Self {
        Self {
            fetch,
            metrics,
            timeout,
        }
    }

    pub fn metrics(&self) -> &Arc<ExporterMetrics> {
        &self.metrics
    }

    /// Run every planned source and render the full exposition.
    pub async fn collect(&self, plan: &[PlannedSource]) -> String {
        let (samples, _) = self.run_cycle(plan).await;
        self.metrics.render(&samples)
    }

    /// Run one cycle, returning the cycle's samples and per-source outcomes.
    pub async fn run_cycle(&self, plan: &[PlannedSource]) -> (Vec<Sample>, Vec<SourceOutcome>) {
        self.metrics.scrapes_total.inc(&[]);
        self.metrics.last_scrape_error.set(&[], 0);

        let (sink, mut rx) = MetricSink::channel(SINK_CAPACITY);
        let now = Utc::now();

        let mut tasks = JoinSet::new();
        for planned in plan {
            let ctx = ScrapeCtx {
                fetch: Arc::clone(&self.fetch),
                params: planned.params.clone(),
                sink: sink.clone(),
                metrics: Arc::clone(&self.metrics),
                now,
            };
            let source = Arc::clone(&planned.source);
            let name = source.name();
            let deadline = self.timeout;
            let span = tracing::info_span!("scrape", source = name);

            tasks.spawn(
                async move {
                    let started = Instant::now();
                    let run = tokio::time::timeout(deadline, source.scrape(&ctx));
                    let result = match AssertUnwindSafe(run).catch_unwind().await {
                        Ok(Ok(r)) => r,
                        Ok(Err(_)) => Err(KubecostError::Timeout(millis(deadline))),
                        Err(_) => Err(KubecostError::Internal(format!("source {name} panicked"))),
                    };
                    SourceOutcome {
                        source: name,
                        elapsed: started.elapsed(),
                        result,
                    }
                }
                .instrument(span),
            );
        }
        // only task clones keep the channel open now
        drop(sink);

        let mut samples = Vec::new();
        let mut outcomes = Vec::with_capacity(plan.len());
        loop {
            tokio::select! {
                Some(sample) = rx.recv() => samples.push(sample),
                Some(joined) = tasks.join_next() => match joined {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => tracing::error!(error = %e, "scrape task did not complete"),
                },
                else => break,
            }
        }

        for outcome in &outcomes {
            samples.push(self.record(outcome));
        }

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        let all_failed = !plan.is_empty() && failed >= plan.len();
        self.metrics.up.set(&[], if all_failed { 0 } else { 1 });

        tracing::debug!(
            sources = plan.len(),
            failed,
            samples = samples.len(),
            "collection cycle done"
        );
        (samples, outcomes)
    }

    /// Log the outcome, bump error metrics, and build the duration sample.
    fn record(&self, outcome: &SourceOutcome) -> Sample {
        let collector = collector_label(outcome.source);
        if let Err(e) = &outcome.result {
            tracing::error!(
                source = outcome.source,
                kind = e.kind().as_str(),
                error = %e,
                "error scraping kubecost"
            );
            self.metrics
                .scrape_errors
                .inc(&[("collector", collector.as_str())]);
            self.metrics.last_scrape_error.set(&[], 1);
        }
        Sample::gauge(
            COLLECTOR_DURATION,
            COLLECTOR_DURATION_HELP,
            LabelSet::with("collector", collector),
            outcome.elapsed.as_secs_f64(),
        )
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
