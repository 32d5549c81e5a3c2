//! Allocation records returned by `/model/allocation`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::asset::Window;
use super::{null_default, FreeformLabels, RejectedRecord};
use crate::error::{KubecostError, Result};

/// Name of the synthetic allocation holding a cluster's idle cost.
pub const IDLE_ALLOCATION: &str = "__idle__";

/// Kubernetes objects an allocation was aggregated over.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationProperties {
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub controller: Option<String>,
    #[serde(default)]
    pub controller_kind: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub pod: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub services: Vec<String>,
    #[serde(default, rename = "providerID")]
    pub provider_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub labels: FreeformLabels,
    #[serde(default, deserialize_with = "null_default")]
    pub annotations: FreeformLabels,
}

impl AllocationProperties {
    /// Properties paired with their label names, in export order.
    pub fn labeled(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("property_namespace", self.namespace.as_deref()),
            ("property_node", self.node.as_deref()),
            ("property_cluster", self.cluster.as_deref()),
            ("property_provider_id", self.provider_id.as_deref()),
            ("property_container", self.container.as_deref()),
            ("property_controller", self.controller.as_deref()),
            ("property_pod", self.pod.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAllocationOnly {
    #[serde(default)]
    pub cpu_core_usage_max: f64,
    #[serde(default)]
    pub ram_byte_usage_max: f64,
}

/// Cost of one Kubernetes-object aggregate over the query window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub name: String,
    #[serde(default)]
    pub properties: Option<AllocationProperties>,
    #[serde(default, deserialize_with = "null_default")]
    pub window: Window,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cpu_core_hours: f64,
    #[serde(default)]
    pub cpu_core_request_average: f64,
    #[serde(default)]
    pub cpu_core_usage_average: f64,
    #[serde(default)]
    pub cpu_cost: f64,
    #[serde(default)]
    pub cpu_cost_adjustment: f64,
    #[serde(default)]
    pub gpu_hours: f64,
    #[serde(default)]
    pub gpu_cost: f64,
    #[serde(default)]
    pub gpu_cost_adjustment: f64,
    #[serde(default)]
    pub network_transfer_bytes: f64,
    #[serde(default)]
    pub network_receive_bytes: f64,
    #[serde(default)]
    pub network_cost: f64,
    #[serde(default)]
    pub network_cost_adjustment: f64,
    #[serde(default)]
    pub load_balancer_cost: f64,
    #[serde(default)]
    pub load_balancer_cost_adjustment: f64,
    #[serde(default)]
    pub pv_cost_adjustment: f64,
    #[serde(default)]
    pub ram_byte_hours: f64,
    #[serde(default)]
    pub ram_byte_request_average: f64,
    #[serde(default)]
    pub ram_byte_usage_average: f64,
    #[serde(default)]
    pub ram_cost: f64,
    #[serde(default)]
    pub ram_cost_adjustment: f64,
    #[serde(default)]
    pub shared_cost: f64,
    #[serde(default)]
    pub external_cost: f64,
    #[serde(default)]
    pub raw_allocation_only: Option<RawAllocationOnly>,
    pub total_cost: f64,
}

impl Allocation {
    pub fn is_idle(&self) -> bool {
        self.name == IDLE_ALLOCATION
    }

    pub fn cluster(&self) -> Option<&str> {
        self.properties.as_ref().and_then(|p| p.cluster.as_deref())
    }
}

/// Response body. `data` is a one-element sequence whose element is the
/// name -> allocation mapping; the records themselves are decoded one by one.
#[derive(Debug, Deserialize)]
pub struct AllocationResponse {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub data: Vec<Option<BTreeMap<String, Value>>>,
}

#[derive(Debug, Default)]
pub struct DecodedAllocations {
    pub records: Vec<Allocation>,
    pub rejected: Vec<RejectedRecord>,
}

/// Decode an allocation response body.
///
/// An upstream error code or an empty `data` sequence is a scrape error;
/// a `null` first element is an empty (but valid) window.
pub fn decode_allocations(body: &[u8]) -> Result<DecodedAllocations> {
    let resp: AllocationResponse = serde_json::from_slice(body)?;

    if let Some(code) = resp.code {
        if code != 200 {
            return Err(KubecostError::Scrape(format!(
                "allocation api returned code {code}: {}",
                resp.message.or(resp.status).unwrap_or_default()
            )));
        }
    }

    let mut data = resp.data.into_iter();
    let Some(first) = data.next() else {
        return Err(KubecostError::Scrape("empty allocations".into()));
    };

    let mut out = DecodedAllocations::default();
    for (key, value) in first.unwrap_or_default() {
        match serde_json::from_value::<Allocation>(value) {
            Ok(record) => out.records.push(record),
            Err(e) => out.rejected.push(RejectedRecord {
                key,
                error: e.into(),
            }),
        }
    }
    Ok(out)
}
