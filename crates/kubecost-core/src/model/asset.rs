//! Asset records returned by `/model/assets`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{null_default, FreeformLabels};
use crate::error::Result;

/// Discriminator carried in the `type` field of every asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Disk,
    Cloud,
    Node,
    LoadBalancer,
    ClusterManagement,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Disk,
        AssetKind::Cloud,
        AssetKind::Node,
        AssetKind::LoadBalancer,
        AssetKind::ClusterManagement,
    ];

    /// Exact discriminator string used by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Disk => "Disk",
            AssetKind::Cloud => "Cloud",
            AssetKind::Node => "Node",
            AssetKind::LoadBalancer => "LoadBalancer",
            AssetKind::ClusterManagement => "ClusterManagement",
        }
    }

    /// Match is exact and case-sensitive; anything else is not an asset kind.
    pub fn from_discriminator(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Well-known asset properties. Each one is present only when upstream set it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetProperties {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "providerID")]
    pub provider_id: Option<String>,
}

impl AssetProperties {
    /// Properties paired with their label names, in export order.
    pub fn labeled(&self) -> [(&'static str, Option<&str>); 8] {
        [
            ("property_category", self.category.as_deref()),
            ("property_name", self.name.as_deref()),
            ("property_cluster", self.cluster.as_deref()),
            ("property_service", self.service.as_deref()),
            ("property_account", self.account.as_deref()),
            ("property_project", self.project.as_deref()),
            ("property_provider", self.provider.as_deref()),
            ("property_provider_id", self.provider_id.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

/// Usage split of a disk or node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Breakdown {
    #[serde(default)]
    pub idle: f64,
    #[serde(default)]
    pub other: f64,
    #[serde(default)]
    pub system: f64,
    #[serde(default)]
    pub user: f64,
}

/// Fields shared by every asset kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    #[serde(default)]
    pub properties: Option<AssetProperties>,
    #[serde(default, deserialize_with = "null_default")]
    pub labels: FreeformLabels,
    #[serde(default, deserialize_with = "null_default")]
    pub window: Window,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub minutes: f64,
    #[serde(default)]
    pub adjustment: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    #[serde(flatten)]
    pub meta: AssetMeta,
    #[serde(default)]
    pub byte_hours: f64,
    #[serde(default)]
    pub bytes: f64,
    #[serde(default)]
    pub local: f64,
    #[serde(default)]
    pub breakdown: Option<Breakdown>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cloud {
    #[serde(flatten)]
    pub meta: AssetMeta,
    #[serde(default)]
    pub credit: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(flatten)]
    pub meta: AssetMeta,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub cpu_cores: f64,
    #[serde(default)]
    pub ram_bytes: f64,
    #[serde(default)]
    pub cpu_core_hours: f64,
    #[serde(default)]
    pub ram_byte_hours: f64,
    #[serde(default, rename = "GPUHours")]
    pub gpu_hours: f64,
    #[serde(default)]
    pub gpu_count: f64,
    #[serde(default)]
    pub cpu_cost: f64,
    #[serde(default)]
    pub gpu_cost: f64,
    #[serde(default)]
    pub ram_cost: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub preemptible: f64,
    #[serde(default)]
    pub cpu_breakdown: Option<Breakdown>,
    #[serde(default)]
    pub ram_breakdown: Option<Breakdown>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    #[serde(flatten)]
    pub meta: AssetMeta,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManagement {
    #[serde(flatten)]
    pub meta: AssetMeta,
    #[serde(default)]
    pub provisioner_name: Option<String>,
}

/// One decoded asset. Closed set: the discriminator decides the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetRecord {
    Disk(Disk),
    Cloud(Cloud),
    Node(Node),
    LoadBalancer(LoadBalancer),
    ClusterManagement(ClusterManagement),
}

impl AssetRecord {
    /// Decode a single asset mapping into the variant selected by `kind`.
    pub fn from_value(kind: AssetKind, value: Value) -> Result<Self> {
        let record = match kind {
            AssetKind::Disk => AssetRecord::Disk(serde_json::from_value(value)?),
            AssetKind::Cloud => AssetRecord::Cloud(serde_json::from_value(value)?),
            AssetKind::Node => AssetRecord::Node(serde_json::from_value(value)?),
            AssetKind::LoadBalancer => AssetRecord::LoadBalancer(serde_json::from_value(value)?),
            AssetKind::ClusterManagement => {
                AssetRecord::ClusterManagement(serde_json::from_value(value)?)
            }
        };
        Ok(record)
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            AssetRecord::Disk(_) => AssetKind::Disk,
            AssetRecord::Cloud(_) => AssetKind::Cloud,
            AssetRecord::Node(_) => AssetKind::Node,
            AssetRecord::LoadBalancer(_) => AssetKind::LoadBalancer,
            AssetRecord::ClusterManagement(_) => AssetKind::ClusterManagement,
        }
    }

    pub fn meta(&self) -> &AssetMeta {
        match self {
            AssetRecord::Disk(a) => &a.meta,
            AssetRecord::Cloud(a) => &a.meta,
            AssetRecord::Node(a) => &a.meta,
            AssetRecord::LoadBalancer(a) => &a.meta,
            AssetRecord::ClusterManagement(a) => &a.meta,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.meta().total_cost
    }

    pub fn properties(&self) -> Option<&AssetProperties> {
        self.meta().properties.as_ref()
    }

    pub fn labels(&self) -> &FreeformLabels {
        &self.meta().labels
    }
}
