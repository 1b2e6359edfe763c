//! Terminal UI layer for Cohort Dash.
//!
//! Provides themes, funnel bars, header components, overview, funnel and
//! comparison views, and the main application event loop built on top of
//! [`ratatui`] for rendering cohort dashboards in the terminal.

pub mod app;
pub mod compare_view;
pub mod components;
pub mod funnel_view;
pub mod table_view;
pub mod themes;

pub use cohort_core as core;
