//! Core library for the `aqmon` air quality monitor.
//!
//! This crate defines:
//! - Indian AQI normalization, health index and advice
//! - The synthetic historical series generator
//! - Abstraction over the current-conditions provider (OpenWeatherMap)
//! - The dashboard service used by the HTTP API and the CLI
//! - Configuration & credentials handling
//!
//! It is used by `aqmon-server` and `aqmon-cli`, but can also be reused by other binaries or services.

pub mod advice;
pub mod aqi;
pub mod city;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod meteo;
pub mod model;
pub mod provider;

pub use aqi::{AqiCategory, indian_aqi};
pub use city::City;
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{DashboardError, ErrorBody};
pub use model::{
    AirQualitySample, Comparison, CurrentConditions, HistoricalSeries, Period, PollutantReading,
    SeriesKind, SeriesPoints, WeatherSample,
};
pub use provider::{EnvironmentProvider, HttpClient, HttpResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
