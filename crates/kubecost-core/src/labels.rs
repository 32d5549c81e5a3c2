//! Label projection: typed records -> ordered metric label sets.
//!
//! Asset order:
//! 1. well-known properties (`property_<field>`), only when non-empty
//! 2. `type` = asset kind
//! 3. free-form labels, `-` replaced by `_` in both key and value
//!
//! Allocation order is the same with allocation properties, without `type`.
//! The idle allocation is exported as exactly
//! `{property_cluster, property_namespace="__idle__"}`.

use serde_json::Value;

use crate::error::{KubecostError, Result};
use crate::model::{Allocation, AssetRecord, FreeformLabels, IDLE_ALLOCATION};

/// Ordered label names with their matching values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelSet {
    names: Vec<String>,
    values: Vec<String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one label.
    pub fn with(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            values: vec![value.into()],
        }
    }

    /// Append a label. Names are unique within a set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(KubecostError::Label(format!("duplicate label name: {name}")));
        }
        self.names.push(name);
        self.values.push(value.into());
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Replace every `-` with `_`.
pub fn sanitize(s: &str) -> String {
    s.replace('-', "_")
}

/// Turn a free-form key into a valid metric label name.
///
/// `-` becomes `_` like any other character outside `[a-zA-Z0-9_]`; a leading
/// digit gets a `_` prefix.
pub fn label_name(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(KubecostError::Label("empty label name".into()));
    }
    let mut name: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    Ok(name)
}

/// Project an asset record.
pub fn project(record: &AssetRecord) -> Result<LabelSet> {
    let mut set = LabelSet::new();
    if let Some(props) = record.properties() {
        push_present(&mut set, props.labeled())?;
    }
    set.push("type", record.kind().as_str())?;
    push_freeform(&mut set, record.labels())?;
    Ok(set)
}

/// Project an allocation record.
pub fn project_allocation(alloc: &Allocation) -> Result<LabelSet> {
    let mut set = LabelSet::new();
    if alloc.is_idle() {
        set.push("property_cluster", alloc.cluster().unwrap_or_default())?;
        set.push("property_namespace", IDLE_ALLOCATION)?;
        return Ok(set);
    }
    if let Some(props) = &alloc.properties {
        push_present(&mut set, props.labeled())?;
        push_freeform(&mut set, &props.labels)?;
    }
    Ok(set)
}

fn push_present<const N: usize>(
    set: &mut LabelSet,
    fields: [(&'static str, Option<&str>); N],
) -> Result<()> {
    for (name, value) in fields {
        match value {
            Some(v) if !v.is_empty() => set.push(name, v)?,
            _ => {}
        }
    }
    Ok(())
}

fn push_freeform(set: &mut LabelSet, labels: &FreeformLabels) -> Result<()> {
    for (key, value) in labels {
        let Value::String(text) = value else {
            return Err(KubecostError::Label(format!(
                "label {key} has a non-text value: {value}"
            )));
        };
        set.push(label_name(key)?, sanitize(text))?;
    }
    Ok(())
}
