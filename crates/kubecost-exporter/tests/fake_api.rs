//! In-memory stand-in for the Kubecost API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use kubecost_core::error::{KubecostError, Result};
use kubecost_exporter::client::{Fetch, ALLOCATION_PATH, ASSETS_PATH};
use kubecost_exporter::config::ExporterConfig;

pub type Call = (String, Vec<(String, String)>);

#[derive(Default)]
pub struct FakeApi {
    bodies: HashMap<String, std::result::Result<Vec<u8>, String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, path: &str, body: Value) -> Self {
        self.bodies.insert(path.to_string(), Ok(body.to_string().into_bytes()));
        self
    }

    pub fn raw(mut self, path: &str, body: &str) -> Self {
        self.bodies.insert(path.to_string(), Ok(body.as_bytes().to_vec()));
        self
    }

    pub fn fail(mut self, path: &str, msg: &str) -> Self {
        self.bodies.insert(path.to_string(), Err(msg.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_to(&self, path: &str) -> Option<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .find(|(p, _)| p == path)
            .map(|(_, q)| q)
    }
}

#[async_trait]
impl Fetch for FakeApi {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Bytes> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_vec()));
        match self.bodies.get(path) {
            Some(Ok(body)) => Ok(Bytes::from(body.clone())),
            Some(Err(msg)) => Err(KubecostError::Scrape(msg.clone())),
            None => Err(KubecostError::Scrape(format!("GET {path} returned 404 Not Found"))),
        }
    }
}

pub fn config() -> ExporterConfig {
    let mut cfg = ExporterConfig::default();
    cfg.kubecost.base_url = "http://kubecost.test".into();
    cfg
}

pub fn assets_body() -> Value {
    json!({
        "code": 200,
        "data": [{
            "gcp/prod/Disk/pvc-0c1f": {
                "type": "Disk",
                "properties": {
                    "category": "Storage",
                    "cluster": "prod",
                    "name": "pvc-0c1f",
                    "providerID": "pvc-0c1f"
                },
                "labels": { "team-id": "cost-ops" },
                "bytes": 10737418240u64,
                "totalCost": 0.0329
            },
            "gcp/prod/Node/gke-prod-pool-1": {
                "type": "Node",
                "properties": {
                    "category": "Compute",
                    "provider": "GCP",
                    "cluster": "prod",
                    "name": "gke-prod-pool-1"
                },
                "labels": {},
                "nodeType": "e2-standard-4",
                "cpuCores": 4,
                "totalCost": 3.22
            }
        }]
    })
}

pub fn allocation_body() -> Value {
    json!({
        "code": 200,
        "status": "success",
        "data": [{
            "__idle__": {
                "name": "__idle__",
                "properties": { "cluster": "eu-1" },
                "totalCost": 3.0
            },
            "payments": {
                "name": "payments",
                "properties": { "cluster": "eu-1", "namespace": "payments" },
                "totalCost": 7.5
            }
        }]
    })
}

pub fn healthy() -> FakeApi {
    FakeApi::new()
        .ok(ASSETS_PATH, assets_body())
        .ok(ALLOCATION_PATH, allocation_body())
}

/// Lines of the exposition starting with `name` (samples only).
pub fn samples<'a>(body: &'a str, name: &str) -> Vec<&'a str> {
    body.lines()
        .filter(|l| !l.starts_with('#'))
        .filter(|l| l.starts_with(&format!("{name}{{")) || l.starts_with(&format!("{name} ")))
        .collect()
}
