//! Domain layer for the cohort dashboard.
//!
//! Holds the cohort table model, the cell-coercion rules that turn raw CSV
//! text into numbers, display formatting, the shared error type, and CLI
//! settings handling.

pub mod coerce;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
