//! HTTP API for the `aqmon` dashboard.
//!
//! A thin axum layer over [`aqmon_core::Dashboard`]: it parses query parameters,
//! calls the dashboard and renders results or structured errors as JSON.

pub mod api;
pub mod error;
pub mod web;

pub use error::ApiError;
pub use web::{app, run};
