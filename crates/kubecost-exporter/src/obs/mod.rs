//! Exporter observability: the per-cycle metric sink and the registry of
//! counters/gauges carried across requests, both rendered in Prometheus text
//! exposition format by the telemetry handler.

pub mod metrics;
pub mod sink;

pub use metrics::ExporterMetrics;
pub use sink::{MetricSink, MetricType, Sample};
