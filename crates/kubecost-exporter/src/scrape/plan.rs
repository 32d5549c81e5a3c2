//! Per-request source selection.
//!
//! - `collect[]=<name>` (repeatable) narrows the enabled sources.
//! - `<name>[]=k=v,k=v` replaces that source's configured params.
//!
//! Neither can enable a source that is disabled in config.

use std::sync::Arc;

use crate::sources::params::{self, QueryParams};
use crate::sources::Source;

const COLLECT_KEY: &str = "collect[]";

#[derive(Clone)]
pub struct PlannedSource {
    pub source: Arc<dyn Source>,
    /// Request override, `None` to use the configured params.
    pub params: Option<QueryParams>,
}

impl PlannedSource {
    pub fn name(&self) -> &'static str {
        self.source.name()
    }
}

pub fn from_query(enabled: &[Arc<dyn Source>], query: &[(String, String)]) -> Vec<PlannedSource> {
    let filters: Vec<&str> = query
        .iter()
        .filter(|(k, _)| k == COLLECT_KEY)
        .map(|(_, v)| v.as_str())
        .collect();

    for f in &filters {
        if !enabled.iter().any(|s| s.name() == *f) {
            tracing::debug!(collector = %f, "collect[] names no enabled source");
        }
    }

    enabled
        .iter()
        .filter(|s| filters.is_empty() || filters.contains(&s.name()))
        .map(|s| PlannedSource {
            source: Arc::clone(s),
            params: override_for(s.name(), query),
        })
        .collect()
}

fn override_for(name: &str, query: &[(String, String)]) -> Option<QueryParams> {
    let key = format!("{name}[]");
    let mut out: Option<QueryParams> = None;
    for (_, v) in query.iter().filter(|(k, _)| *k == key) {
        out.get_or_insert_with(Vec::new)
            .extend(params::parse_override(v));
    }
    out
}
