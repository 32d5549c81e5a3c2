//! Query parameter handling shared by sources.

use chrono::{DateTime, Utc};

use kubecost_core::window::QueryWindow;

pub type QueryParams = Vec<(String, String)>;

/// Parse `k=v` strings. An entry without `=` is a key with an empty value;
/// blank entries are dropped.
pub fn parse_pairs<S: AsRef<str>>(raw: &[S]) -> QueryParams {
    raw.iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(|s| match s.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (s.to_string(), String::new()),
        })
        .collect()
}

/// Parse a per-request override: `k=v,k=v`.
pub fn parse_override(raw: &str) -> QueryParams {
    let parts: Vec<&str> = raw.split(',').collect();
    parse_pairs(&parts)
}

/// Append the rolling `window` and `accumulate=true` unless the caller
/// already supplied them.
pub fn with_window(mut params: QueryParams, offset_days: u32, now: DateTime<Utc>) -> QueryParams {
    if !has_key(&params, "window") {
        let window = QueryWindow::days_back(now, offset_days);
        params.push(("window".into(), window.to_param()));
    }
    if !has_key(&params, "accumulate") {
        params.push(("accumulate".into(), "true".into()));
    }
    params
}

fn has_key(params: &QueryParams, key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 12, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn window_and_accumulate_are_appended() {
        let params = with_window(parse_pairs(&["aggregate=namespace"]), 1, now());
        assert_eq!(
            params,
            vec![
                ("aggregate".to_string(), "namespace".to_string()),
                ("window".to_string(), "2021-12-14T00:00:00Z,2021-12-15T00:00:00Z".to_string()),
                ("accumulate".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn caller_window_wins() {
        let params = with_window(parse_override("window=7d,accumulate=false"), 1, now());
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], ("window".to_string(), "7d".to_string()));
        assert_eq!(params[1], ("accumulate".to_string(), "false".to_string()));
    }

    #[test]
    fn override_parsing_tolerates_blanks_and_bare_keys() {
        let params = parse_override("filterClusters=a,,idle");
        assert_eq!(
            params,
            vec![
                ("filterClusters".to_string(), "a".to_string()),
                ("idle".to_string(), String::new()),
            ]
        );
    }
}
