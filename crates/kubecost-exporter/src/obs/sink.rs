//! Per-cycle metric sink.
//!
//! Every source task holds a clone of the same [`MetricSink`]; one bounded
//! channel carries whole samples to the single reader in the orchestrator, so
//! a sample's labels and value can never interleave with another writer's.

use kubecost_core::error::{KubecostError, Result};
use kubecost_core::labels::LabelSet;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

/// Metric name + label set + value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricType,
    pub labels: LabelSet,
    pub value: f64,
}

impl Sample {
    pub fn gauge(name: &'static str, help: &'static str, labels: LabelSet, value: f64) -> Self {
        Self {
            name,
            help,
            kind: MetricType::Gauge,
            labels,
            value,
        }
    }
}

#[derive(Clone)]
pub struct MetricSink {
    tx: mpsc::Sender<Sample>,
}

impl MetricSink {
    /// Create a sink and the receiving end that drains it.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Sample>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Hand one sample to the cycle. Waits while the channel is full.
    pub async fn send(&self, sample: Sample) -> Result<()> {
        self.tx
            .send(sample)
            .await
            .map_err(|_| KubecostError::Internal("metric sink closed".into()))
    }
}
