//! Reusable presentation components shared by the views.

pub mod funnel_bar;
pub mod header;
