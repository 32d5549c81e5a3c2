//! Cost-model records (Assets + Allocation).
//!
//! The upstream API answers with JSON whose shape is only loosely fixed:
//! - Assets: a map of synthetic asset ids to assets of several kinds, nested
//!   under one or more `data` keys.
//! - Allocation: `{code, status, data: [ {name -> allocation} ]}`.
//!
//! Decoding is two-phase. The body is first parsed into a generic
//! `serde_json::Value` tree, then a dispatcher converts each entry into a
//! closed, typed record. Entries that match a known kind but fail to decode
//! are reported as [`RejectedRecord`]s instead of being dropped or zeroed.

pub mod allocation;
pub mod asset;
pub mod envelope;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::KubecostError;

pub use allocation::{
    decode_allocations, Allocation, AllocationProperties, AllocationResponse, DecodedAllocations,
    IDLE_ALLOCATION,
};
pub use asset::{
    AssetKind, AssetMeta, AssetProperties, AssetRecord, Breakdown, Cloud, ClusterManagement, Disk,
    LoadBalancer, Node, Window,
};
pub use envelope::{decode, decode_slice, DecodedAssets};

/// Free-form, user-defined labels. Values are kept raw so that a non-text
/// value is reported by the label projector instead of failing the decode.
pub type FreeformLabels = BTreeMap<String, Value>;

/// A record whose kind was recognised but whose fields did not decode.
#[derive(Debug)]
pub struct RejectedRecord {
    /// Key the record was found under (asset id or allocation name).
    pub key: String,
    pub error: KubecostError,
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
