//! JSON fixture loader shared by decode and projection tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;

pub fn load_bytes(name: &str) -> Vec<u8> {
    fs::read(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|e| panic!("missing fixture {name}: {e}"))
}

pub fn load_value(name: &str) -> serde_json::Value {
    serde_json::from_slice(&load_bytes(name)).expect("fixture must be valid json")
}
