//! Assets envelope decoder.
//!
//! Walk rules:
//! - sequence: every element is walked, results concatenated in order.
//! - mapping: a `data` key is unwrapped and walked; any other key whose value
//!   is a mapping is a candidate asset and goes to the dispatcher. Scalar
//!   siblings (`code`, `status`, `message`) carry no assets.
//! - any scalar where an envelope is expected, `null` included:
//!   `KubecostError::Decode`.
//!
//! The dispatcher never walks into a candidate. A candidate without a `type`
//! field, or with a `type` that is not a known [`AssetKind`], is skipped
//! without error.

use serde_json::{Map, Value};

use super::asset::{AssetKind, AssetRecord};
use super::RejectedRecord;
use crate::error::{KubecostError, Result};

/// Output of one decode pass, in walk order.
#[derive(Debug, Default)]
pub struct DecodedAssets {
    pub records: Vec<AssetRecord>,
    /// Envelope key of each entry in `records`, same index.
    pub keys: Vec<String>,
    pub rejected: Vec<RejectedRecord>,
}

impl DecodedAssets {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.rejected.is_empty()
    }

    /// Records paired with the asset id they were found under.
    pub fn keyed(&self) -> impl Iterator<Item = (&str, &AssetRecord)> {
        self.keys.iter().map(String::as_str).zip(self.records.iter())
    }
}

/// Decode a raw response body.
pub fn decode_slice(body: &[u8]) -> Result<DecodedAssets> {
    let raw: Value = serde_json::from_slice(body)?;
    decode(&raw)
}

/// Decode an already parsed envelope.
pub fn decode(raw: &Value) -> Result<DecodedAssets> {
    let mut out = DecodedAssets::default();
    walk(raw, &mut out)?;
    Ok(out)
}

fn walk(value: &Value, out: &mut DecodedAssets) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                walk(item, out)?;
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                if key == "data" {
                    tracing::debug!("envelope: unwrapping data");
                    walk(child, out)?;
                } else if let Value::Object(candidate) = child {
                    dispatch(key, candidate, out);
                }
            }
        }
        other => {
            return Err(KubecostError::Decode(format!(
                "unsupported envelope shape: {}",
                shape_name(other)
            )));
        }
    }
    Ok(())
}

fn dispatch(key: &str, candidate: &Map<String, Value>, out: &mut DecodedAssets) {
    let Some(discriminator) = candidate.get("type") else {
        tracing::debug!(key, "asset without type field skipped");
        return;
    };
    let Some(kind) = discriminator.as_str().and_then(AssetKind::from_discriminator) else {
        tracing::debug!(key, %discriminator, "asset of unknown type skipped");
        return;
    };

    match AssetRecord::from_value(kind, Value::Object(candidate.clone())) {
        Ok(record) => {
            tracing::debug!(key, kind = kind.as_str(), "asset decoded");
            out.records.push(record);
            out.keys.push(key.to_string());
        }
        Err(error) => out.rejected.push(RejectedRecord {
            key: key.to_string(),
            error,
        }),
    }
}

fn shape_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
