//! Exporter metrics registry and text rendering.
//!
//! Counters and gauges that must survive between requests (scrape totals,
//! error counts) live here as atomics with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors to keep deterministic
//! ordering. Per-cycle samples are rendered alongside them and then dropped.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use super::sink::{MetricType, Sample};

// Metric names: `<namespace>_<subsystem>_<name>`, namespace `assets`.
pub const COST_TOTAL: &str = "assets_cost_total";
pub const COST_TOTAL_HELP: &str = "Asset total cost from Kubecost Assets API";
pub const ALLOCATION_COST_TOTAL: &str = "assets_cost_cluster_allocation_total";
pub const ALLOCATION_COST_TOTAL_HELP: &str = "k8s total cost from Kubecost Allocation API";
pub const COLLECTOR_DURATION: &str = "assets_exporter_collector_duration_seconds";
pub const COLLECTOR_DURATION_HELP: &str = "Collector time duration.";

const SCRAPES_TOTAL: &str = "assets_exporter_scrapes_total";
const SCRAPE_ERRORS_TOTAL: &str = "assets_exporter_scrape_errors_total";
const REJECTED_RECORDS_TOTAL: &str = "assets_exporter_rejected_records_total";
const LAST_SCRAPE_ERROR: &str = "assets_exporter_last_scrape_error";
const UP: &str = "assets_up";
const BUILD_INFO: &str = "assets_exporter_build_info";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// `{k="v",...}`, or nothing for an empty label set.
fn format_labels<'a>(labels: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let body = labels
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    if body.is_empty() {
        body
    } else {
        format!("{{{}}}", body)
    }
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else {
        v.to_string()
    }
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value, 0 when the label set was never touched.
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, MetricType::Counter.as_str());
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| {
                let labels = format_labels(r.key().iter().map(|(k, v)| (k.as_str(), v.as_str())));
                (labels, r.value().load(Ordering::Relaxed))
            })
            .collect();
        rows.sort();
        for (labels, val) in rows {
            let _ = writeln!(out, "{}{} {}", name, labels, val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    /// Overwrite the value.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, MetricType::Gauge.as_str());
        let mut rows: Vec<(String, i64)> = self
            .map
            .iter()
            .map(|r| {
                let labels = format_labels(r.key().iter().map(|(k, v)| (k.as_str(), v.as_str())));
                (labels, r.value().load(Ordering::Relaxed))
            })
            .collect();
        rows.sort();
        for (labels, val) in rows {
            let _ = writeln!(out, "{}{} {}", name, labels, val);
        }
    }
}

/// Render one cycle's samples, grouped per metric name in first-seen order.
/// Within a family, samples keep their arrival order.
pub fn render_samples(samples: &[Sample], out: &mut String) {
    let mut families: Vec<&Sample> = Vec::new();
    for s in samples {
        if !families.iter().any(|f| f.name == s.name) {
            families.push(s);
        }
    }
    for head in families {
        write_header(out, head.name, head.help, head.kind.as_str());
        for s in samples.iter().filter(|s| s.name == head.name) {
            let _ = writeln!(
                out,
                "{}{} {}",
                s.name,
                format_labels(s.labels.iter()),
                format_value(s.value)
            );
        }
    }
}

/// Metrics whose values are carried between requests.
#[derive(Default)]
pub struct ExporterMetrics {
    pub scrapes_total: CounterVec,
    pub scrape_errors: CounterVec,
    pub rejected_records: CounterVec,
    pub last_scrape_error: GaugeVec,
    pub up: GaugeVec,
}

impl ExporterMetrics {
    /// Render a cycle's samples followed by the carried metrics.
    pub fn render(&self, cycle: &[Sample]) -> String {
        let mut out = String::new();
        render_samples(cycle, &mut out);
        self.scrapes_total.render(
            SCRAPES_TOTAL,
            "Total number of times Kubecost was scraped for metrics.",
            &mut out,
        );
        self.scrape_errors.render(
            SCRAPE_ERRORS_TOTAL,
            "Total number of times an error occurred scraping Kubecost.",
            &mut out,
        );
        self.rejected_records.render(
            REJECTED_RECORDS_TOTAL,
            "Total number of upstream records skipped because they could not be decoded or labeled.",
            &mut out,
        );
        self.last_scrape_error.render(
            LAST_SCRAPE_ERROR,
            "Whether the last scrape of metrics from Kubecost resulted in an error (1 for error, 0 for success).",
            &mut out,
        );
        self.up.render(UP, "Whether the Kubecost API is up.", &mut out);

        write_header(&mut out, BUILD_INFO, "Exporter build information.", MetricType::Gauge.as_str());
        let _ = writeln!(
            out,
            "{}{{version=\"{}\"}} 1",
            BUILD_INFO,
            env!("CARGO_PKG_VERSION")
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubecost_core::labels::LabelSet;

    #[test]
    fn samples_are_grouped_under_one_header() {
        let mut a = LabelSet::with("property_cluster", "prod");
        let _ = a.push("type", "Disk");
        let b = LabelSet::with("type", "Node");
        let samples = vec![
            Sample::gauge(COST_TOTAL, COST_TOTAL_HELP, a, 12.5),
            Sample::gauge(COLLECTOR_DURATION, COLLECTOR_DURATION_HELP, LabelSet::with("collector", "collect.x"), 0.25),
            Sample::gauge(COST_TOTAL, COST_TOTAL_HELP, b, 3.0),
        ];
        let mut out = String::new();
        render_samples(&samples, &mut out);

        assert_eq!(out.matches("# TYPE assets_cost_total gauge").count(), 1);
        let cost_lines: Vec<&str> = out.lines().filter(|l| l.starts_with("assets_cost_total")).collect();
        assert_eq!(
            cost_lines,
            vec![
                "assets_cost_total{property_cluster=\"prod\",type=\"Disk\"} 12.5",
                "assets_cost_total{type=\"Node\"} 3",
            ]
        );
    }

    #[test]
    fn label_values_are_escaped() {
        let labels = LabelSet::with("note", "say \"hi\"\nback\\slash");
        let mut out = String::new();
        render_samples(&[Sample::gauge(COST_TOTAL, COST_TOTAL_HELP, labels, 1.0)], &mut out);
        assert!(out.contains(r#"note="say \"hi\"\nback\\slash""#));
    }

    #[test]
    fn carried_metrics_render_without_empty_braces() {
        let m = ExporterMetrics::default();
        m.scrapes_total.inc(&[]);
        m.scrapes_total.inc(&[]);
        m.scrape_errors.inc(&[("collector", "collect.scrape_assets")]);
        m.up.set(&[], 1);

        let out = m.render(&[]);
        assert!(out.contains("\nassets_exporter_scrapes_total 2\n"));
        assert!(out.contains("assets_exporter_scrape_errors_total{collector=\"collect.scrape_assets\"} 1"));
        assert!(out.contains("\nassets_up 1\n"));
        assert!(out.contains("# TYPE assets_exporter_scrapes_total counter\n"));
        assert!(out.contains("# TYPE assets_up gauge\n"));
        assert!(!out.contains("{}"));
    }

    #[test]
    fn special_float_values() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(-0.5), "-0.5");
    }
}
