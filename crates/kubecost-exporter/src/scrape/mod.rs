//! Collection cycle: which sources run for a request, and running them.

pub mod orchestrator;
pub mod plan;

pub use orchestrator::{Orchestrator, SourceOutcome};
pub use plan::{from_query, PlannedSource};
