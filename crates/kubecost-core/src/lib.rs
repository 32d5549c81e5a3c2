//! kubecost core: cost-model records, envelope decoding, and label projection.
//!
//! This crate turns the schema-free JSON returned by the Kubecost cost-model
//! API into typed records and derives the metric label sets the exporter
//! publishes. It intentionally carries no transport or runtime dependencies so
//! it can be exercised directly from fixtures.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A malformed upstream payload must surface as `KubecostError`/`Result`, or
//! as a rejected record, never as a crashed scrape.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod labels;
pub mod model;
pub mod window;

/// Shared result type.
pub use error::{KubecostError, Result};
