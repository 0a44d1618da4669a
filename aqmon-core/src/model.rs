use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DashboardError;

/// Raw pollutant concentrations, all in μg/m³ as delivered by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    pub pm2_5: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub co: f64,
    pub so2: f64,
    pub nh3: f64,
}

impl PollutantReading {
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Pm2_5 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
            Pollutant::Co => self.co,
            Pollutant::So2 => self.so2,
            Pollutant::Nh3 => self.nh3,
        }
    }

    /// Round every concentration to two decimals.
    pub fn rounded(self) -> Self {
        Self {
            pm2_5: round_to(self.pm2_5, 2),
            pm10: round_to(self.pm10, 2),
            no2: round_to(self.no2, 2),
            o3: round_to(self.o3, 2),
            co: round_to(self.co, 2),
            so2: round_to(self.so2, 2),
            nh3: round_to(self.nh3, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "pm2_5")]
    Pm2_5,
    #[serde(rename = "pm10")]
    Pm10,
    #[serde(rename = "no2")]
    No2,
    #[serde(rename = "o3")]
    O3,
    #[serde(rename = "co")]
    Co,
    #[serde(rename = "so2")]
    So2,
    #[serde(rename = "nh3")]
    Nh3,
}

impl Pollutant {
    pub const fn all() -> &'static [Pollutant] {
        &[
            Pollutant::Pm2_5,
            Pollutant::Pm10,
            Pollutant::No2,
            Pollutant::O3,
            Pollutant::Co,
            Pollutant::So2,
            Pollutant::Nh3,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO₂",
            Pollutant::O3 => "O₃",
            Pollutant::Co => "CO",
            Pollutant::So2 => "SO₂",
            Pollutant::Nh3 => "NH₃",
        }
    }

    /// Exposure guideline, in μg/m³ except CO which is in mg/m³.
    pub fn guideline(&self) -> f64 {
        match self {
            Pollutant::Pm2_5 => 15.0,
            Pollutant::Pm10 => 45.0,
            Pollutant::No2 => 25.0,
            Pollutant::O3 => 100.0,
            Pollutant::Co => 4.0,
            Pollutant::So2 => 40.0,
            Pollutant::Nh3 => 20.0,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One air-quality observation with its derived indices.
///
/// Build it with [`AirQualitySample::from_reading`] so that `aqi_indian`,
/// `health_index` and `dominant_pollutant` always agree with the pollutants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySample {
    pub timestamp: DateTime<Utc>,
    /// Provider ordinal, 1 (good) to 5 (very poor).
    pub aqi: u8,
    /// CPCB-style index, 0 to 500.
    pub aqi_indian: u16,
    #[serde(flatten)]
    pub pollutants: PollutantReading,
    pub dominant_pollutant: Pollutant,
    pub health_index: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    /// °C
    pub temperature: f64,
    pub feels_like: f64,
    /// %
    pub humidity: u8,
    /// hPa
    pub pressure: f64,
    /// km/h
    pub wind_speed: f64,
    /// degrees, meteorological convention
    pub wind_direction: u16,
    /// km
    pub visibility: f64,
    /// %
    pub clouds: u8,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "24h",
            Period::Week => "7d",
            Period::Month => "30d",
        }
    }

    pub fn interval_hours(&self) -> i64 {
        match self {
            Period::Day => 1,
            Period::Week => 6,
            Period::Month => 24,
        }
    }

    pub fn window_hours(&self) -> i64 {
        match self {
            Period::Day => 24,
            Period::Week => 7 * 24,
            Period::Month => 30 * 24,
        }
    }

    /// Number of samples covering the window, both ends included.
    pub fn point_count(&self) -> usize {
        (self.window_hours() / self.interval_hours()) as usize + 1
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(Period::Day),
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            _ => Err(DashboardError::invalid_request(format!(
                "Unknown period '{s}'. Supported periods: 24h, 7d, 30d."
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Aqi,
    Weather,
}

impl SeriesKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Aqi => "aqi",
            SeriesKind::Weather => "weather",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aqi" => Ok(SeriesKind::Aqi),
            "weather" => Ok(SeriesKind::Weather),
            _ => Err(DashboardError::invalid_request(format!(
                "Unknown historical type '{s}'. Supported types: aqi, weather."
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesPoints {
    AirQuality(Vec<AirQualitySample>),
    Weather(Vec<WeatherSample>),
}

impl SeriesPoints {
    pub fn len(&self) -> usize {
        match self {
            SeriesPoints::AirQuality(points) => points.len(),
            SeriesPoints::Weather(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        match self {
            SeriesPoints::AirQuality(points) => points.iter().map(|p| p.timestamp).collect(),
            SeriesPoints::Weather(points) => points.iter().map(|p| p.timestamp).collect(),
        }
    }
}

/// Historical window, oldest point first.
///
/// Without a measurement store every series is generated, and `synthetic` says so.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub kind: SeriesKind,
    pub period: Period,
    pub interval_hours: i64,
    pub synthetic: bool,
    pub generated_at: DateTime<Utc>,
    pub points: SeriesPoints,
}

/// Air quality and weather fetched together for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    pub air_quality: AirQualitySample,
    pub weather: WeatherSample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityComparison {
    pub city: String,
    pub name: String,
    pub aqi_indian: u16,
    pub temperature: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub cities: Vec<CityComparison>,
    pub generated_at: DateTime<Utc>,
}

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
