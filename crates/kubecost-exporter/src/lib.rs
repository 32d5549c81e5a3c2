//! Kubecost exporter library entry.
//!
//! Wires the upstream client, the scrape sources, and the collection cycle
//! into an HTTP endpoint Prometheus can scrape. Used by the binary
//! (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod client;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod scrape;
pub mod sources;
