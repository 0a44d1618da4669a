//! Plain-text rendering for terminal output.

use std::fmt::Write;

use aqmon_core::{
    AirQualitySample, Comparison, HistoricalSeries, SeriesPoints, WeatherSample,
    advice::{self, Severity},
};

use crate::client::Reading;

pub fn air_quality(city: &str, sample: &AirQualitySample) -> String {
    let category = sample.category();
    let p = &sample.pollutants;

    let mut out = String::new();
    let _ = writeln!(out, "Air quality in {city} at {}", sample.timestamp.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "  AQI (India): {} - {}", sample.aqi_indian, category);
    let _ = writeln!(out, "  {}", category.description());
    let _ = writeln!(out, "  Health index: {}/100", sample.health_index);
    let _ = writeln!(out, "  Dominant pollutant: {}", sample.dominant_pollutant);
    let _ = writeln!(
        out,
        "  PM2.5 {:.1}  PM10 {:.1}  NO2 {:.1}  O3 {:.1}  CO {:.1}  SO2 {:.1}  NH3 {:.1} (μg/m³)",
        p.pm2_5, p.pm10, p.no2, p.o3, p.co, p.so2, p.nh3
    );
    out
}

pub fn weather(sample: &WeatherSample) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Weather: {}", sample.description);
    let _ = writeln!(
        out,
        "  {:.1}°C (feels like {:.1}°C), humidity {}%, pressure {:.0} hPa",
        sample.temperature, sample.feels_like, sample.humidity, sample.pressure
    );
    let _ = writeln!(
        out,
        "  Wind {:.1} km/h from {}°, visibility {:.1} km, clouds {}%",
        sample.wind_speed, sample.wind_direction, sample.visibility, sample.clouds
    );
    if let Some(dew_point) = sample.dew_point {
        let _ = writeln!(out, "  Dew point {dew_point:.1}°C");
    }
    if let Some(heat_index) = sample.heat_index {
        let _ = writeln!(out, "  Heat index {heat_index:.1}°C");
    }
    out
}

pub fn advice(sample: &AirQualitySample) -> String {
    let mut out = String::new();

    for alert in advice::alerts(sample) {
        let tag = match alert.severity {
            Severity::Danger => "DANGER",
            Severity::Warning => "WARNING",
        };
        let _ = writeln!(out, "[{tag}] {}", alert.message);
    }

    let _ = writeln!(out, "Recommendations:");
    for line in advice::recommendations(sample.aqi, sample.pollutants.pm2_5) {
        let _ = writeln!(out, "  - {line}");
    }
    out
}

pub fn series(series: &HistoricalSeries) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "SYNTHETIC DATA: generated {} series, not recorded measurements",
        series.kind
    );
    let _ = writeln!(out, "{} points over {}, every {}h", series.points.len(), series.period, series.interval_hours);

    match &series.points {
        SeriesPoints::AirQuality(points) => {
            for p in points {
                let _ = writeln!(
                    out,
                    "  {}  AQI {:>3} ({})  PM2.5 {:>6.1}  PM10 {:>6.1}",
                    p.timestamp.format("%m-%d %H:%M"),
                    p.aqi_indian,
                    p.aqi,
                    p.pollutants.pm2_5,
                    p.pollutants.pm10
                );
            }
        }
        SeriesPoints::Weather(points) => {
            for p in points {
                let _ = writeln!(
                    out,
                    "  {}  {:>5.1}°C  {:>3}%  {:>6.1} hPa  {:>5.1} km/h  {}",
                    p.timestamp.format("%m-%d %H:%M"),
                    p.temperature,
                    p.humidity,
                    p.pressure,
                    p.wind_speed,
                    p.description
                );
            }
        }
    }
    out
}

pub fn comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {:>5} {:>8}  Status", "City", "AQI", "Temp");
    for c in &comparison.cities {
        let _ = writeln!(out, "{:<12} {:>5} {:>6.0}°C  {}", c.name, c.aqi_indian, c.temperature, c.status);
    }
    out
}

/// One section of `watch` output, with a marker when the value is cached.
pub fn reading<T>(label: &str, reading: &Reading<T>, body: impl Fn(&T) -> String) -> String {
    match reading {
        Reading::Fresh(value) => body(value),
        Reading::Stale(value) => format!("(stale, last successful fetch)\n{}", body(value)),
        Reading::Unavailable(err) => format!("{label} unavailable: {err}\n"),
    }
}
