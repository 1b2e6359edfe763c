//! Runtime orchestration layer for Cohort Dash.
//!
//! Coordinates the data-ingestion and UI layers: caches analysis snapshots
//! and drives the periodic refresh loop.

pub mod orchestrator;
pub mod snapshot;

pub use cohort_core as core;
pub use cohort_data as data;
