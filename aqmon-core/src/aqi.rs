//! Indian (CPCB-style) AQI normalization and companion indices.
//!
//! All functions here are pure: identical inputs always give identical outputs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AirQualitySample, Pollutant, PollutantReading};

pub const INDIAN_AQI_MAX: u16 = 500;

/// (concentration upper bound, index at lower bound, index at upper bound)
const PM25_BANDS: &[(f64, f64, f64)] = &[
    (30.0, 0.0, 50.0),
    (60.0, 50.0, 100.0),
    (90.0, 100.0, 200.0),
    (120.0, 200.0, 300.0),
];
const PM25_TAIL_WIDTH: f64 = 30.0;

const PM10_BANDS: &[(f64, f64, f64)] = &[
    (50.0, 0.0, 50.0),
    (100.0, 50.0, 100.0),
    (250.0, 100.0, 200.0),
    (350.0, 200.0, 300.0),
];
const PM10_TAIL_WIDTH: f64 = 80.0;

const HEALTH_WEIGHT_PM25: f64 = 0.35;
const HEALTH_WEIGHT_PM10: f64 = 0.20;
const HEALTH_WEIGHT_NO2: f64 = 0.15;
const HEALTH_WEIGHT_O3: f64 = 0.15;
const HEALTH_WEIGHT_AQI: f64 = 0.15;

/// Map PM2.5 and PM10 (μg/m³) onto the 0–500 scale.
///
/// Each pollutant gets its own piecewise-linear sub-index and the worse one
/// governs. Negative or NaN inputs count as zero.
pub fn indian_aqi(pm25: f64, pm10: f64) -> u16 {
    let worst = pm25_sub_index(pm25).max(pm10_sub_index(pm10));
    worst.round().clamp(0.0, INDIAN_AQI_MAX as f64) as u16
}

pub fn pm25_sub_index(pm25: f64) -> f64 {
    sub_index(pm25, PM25_BANDS, PM25_TAIL_WIDTH)
}

pub fn pm10_sub_index(pm10: f64) -> f64 {
    sub_index(pm10, PM10_BANDS, PM10_TAIL_WIDTH)
}

fn sub_index(concentration: f64, bands: &[(f64, f64, f64)], tail_width: f64) -> f64 {
    // f64::max returns the non-NaN operand
    let c = concentration.max(0.0);

    let mut lower = 0.0;
    for &(upper, index_lo, index_hi) in bands {
        if c <= upper {
            return index_lo + (c - lower) / (upper - lower) * (index_hi - index_lo);
        }
        lower = upper;
    }

    // past the last band: 200 index points per tail width
    let (_, _, top) = bands[bands.len() - 1];
    top + (c - lower) / tail_width * 200.0
}

/// Weighted 0–100 "safety margin" composite. 100 means every pollutant is at zero
/// and the ordinal is Good.
pub fn health_index(reading: &PollutantReading, aqi: u8) -> u8 {
    let aqi_score = (5.0 - aqi.clamp(1, 5) as f64) / 4.0 * 100.0;

    let score = HEALTH_WEIGHT_PM25 * safety_margin(reading.pm2_5, Pollutant::Pm2_5)
        + HEALTH_WEIGHT_PM10 * safety_margin(reading.pm10, Pollutant::Pm10)
        + HEALTH_WEIGHT_NO2 * safety_margin(reading.no2, Pollutant::No2)
        + HEALTH_WEIGHT_O3 * safety_margin(reading.o3, Pollutant::O3)
        + HEALTH_WEIGHT_AQI * aqi_score;

    score.round().clamp(0.0, 100.0) as u8
}

fn safety_margin(concentration: f64, pollutant: Pollutant) -> f64 {
    (100.0 - concentration.max(0.0) / pollutant.guideline() * 100.0).max(0.0)
}

/// Concentration relative to its guideline. CO is converted to mg/m³ first.
pub fn guideline_ratio(reading: &PollutantReading, pollutant: Pollutant) -> f64 {
    let value = match pollutant {
        Pollutant::Co => reading.co / 1000.0,
        other => reading.get(other),
    };
    value.max(0.0) / pollutant.guideline()
}

/// Pollutant furthest above its guideline. Ties go to the one listed first in
/// [`Pollutant::all`].
pub fn dominant_pollutant(reading: &PollutantReading) -> Pollutant {
    let mut dominant = Pollutant::Pm2_5;
    let mut highest = guideline_ratio(reading, dominant);

    for &pollutant in &Pollutant::all()[1..] {
        let ratio = guideline_ratio(reading, pollutant);
        if ratio > highest {
            dominant = pollutant;
            highest = ratio;
        }
    }

    dominant
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AqiCategory {
    Good,
    Fair,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl AqiCategory {
    /// From the provider's 1–5 ordinal.
    pub fn from_ordinal(aqi: u8) -> Self {
        match aqi {
            0 | 1 => AqiCategory::Good,
            2 => AqiCategory::Fair,
            3 => AqiCategory::Moderate,
            4 => AqiCategory::Poor,
            _ => AqiCategory::VeryPoor,
        }
    }

    /// From the 0–500 Indian index.
    pub fn from_indian(aqi_indian: u16) -> Self {
        match aqi_indian {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Fair,
            101..=150 => AqiCategory::Moderate,
            151..=200 => AqiCategory::Poor,
            _ => AqiCategory::VeryPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Fair => "Fair",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is excellent",
            AqiCategory::Fair => "Air quality is acceptable",
            AqiCategory::Moderate => "Air quality is moderate",
            AqiCategory::Poor => "Air quality is poor",
            AqiCategory::VeryPoor => "Air quality is hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl AirQualitySample {
    /// Assemble a sample, deriving the Indian AQI, health index and dominant
    /// pollutant from the reading. The ordinal is clamped to 1..=5.
    pub fn from_reading(timestamp: DateTime<Utc>, aqi: u8, reading: PollutantReading) -> Self {
        let aqi = aqi.clamp(1, 5);
        let pollutants = reading.rounded();

        Self {
            timestamp,
            aqi,
            aqi_indian: indian_aqi(pollutants.pm2_5, pollutants.pm10),
            dominant_pollutant: dominant_pollutant(&pollutants),
            health_index: health_index(&pollutants, aqi),
            pollutants,
        }
    }

    pub fn category(&self) -> AqiCategory {
        AqiCategory::from_indian(self.aqi_indian)
    }
}
