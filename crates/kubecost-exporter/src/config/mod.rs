//! Exporter config loader (strict parsing).

pub mod schema;

use std::env;
use std::fs;
use std::path::Path;

use kubecost_core::error::{KubecostError, Result};

pub use schema::{CollectorConfig, ExporterConfig, KubecostSection, ScrapeSection, WebSection};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "KUBECOST_EXPORTER_CONFIG";
/// Env var overriding `kubecost.base_url`.
pub const BASE_URL_ENV: &str = "KUBECOST_URL";
pub const DEFAULT_CONFIG_PATH: &str = "kubecost-exporter.yaml";

/// Resolve the process config: file (explicit path, default path, or none),
/// then env overrides, then validation.
pub fn load() -> Result<ExporterConfig> {
    let mut cfg = match env::var(CONFIG_PATH_ENV) {
        Ok(path) => parse_file(&path)?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => parse_file(DEFAULT_CONFIG_PATH)?,
        Err(_) => ExporterConfig::default(),
    };
    apply_env(&mut cfg, env::var(BASE_URL_ENV).ok());
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| KubecostError::Config(format!("read config {path} failed: {e}")))?;
    parse_str(&s)
}

fn parse_str(s: &str) -> Result<ExporterConfig> {
    serde_yaml::from_str(s).map_err(|e| KubecostError::Config(format!("invalid yaml: {e}")))
}

/// Apply a `KUBECOST_URL` value; empty values are ignored.
pub fn apply_env(cfg: &mut ExporterConfig, base_url: Option<String>) {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        cfg.kubecost.base_url = url;
    }
}
