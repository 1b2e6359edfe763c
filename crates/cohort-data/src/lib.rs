//! Data ingestion layer for Cohort Dash.
//!
//! Responsible for reading and normalizing the cohort performance CSV,
//! aggregating funnel statistics, comparing cohorts, and running the
//! top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use cohort_core as core;
