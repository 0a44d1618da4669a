use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use aqmon_core::{
    AirQualitySample, City, HistoricalSeries, SeriesPoints, VERSION, WeatherSample,
};

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
pub struct ExportSnapshot {
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub location: String,
    pub current: CurrentExport,
    pub historical: HistoricalExport,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Serialize)]
pub struct CurrentExport {
    pub air_quality: AirQualitySample,
    pub weather: WeatherSample,
}

#[derive(Debug, Serialize)]
pub struct HistoricalExport {
    pub air_quality_24h: HistoricalSeries,
    pub weather_24h: HistoricalSeries,
}

#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    pub export_version: &'static str,
    pub data_source: &'static str,
    pub generated_by: String,
    pub historical_note: &'static str,
}

impl ExportSnapshot {
    pub fn new(
        city: &City,
        air_quality: AirQualitySample,
        weather: WeatherSample,
        air_quality_24h: HistoricalSeries,
        weather_24h: HistoricalSeries,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            city: city.key.to_string(),
            location: format!("{}, India", city.name),
            current: CurrentExport { air_quality, weather },
            historical: HistoricalExport { air_quality_24h, weather_24h },
            metadata: ExportMetadata {
                export_version: EXPORT_VERSION,
                data_source: "OpenWeatherMap API",
                generated_by: format!("aqmon {VERSION}"),
                historical_note: "Historical series are synthetic, not recorded measurements.",
            },
        }
    }

    /// `aqmon-<city>-<YYYY-MM-DD>`
    pub fn file_stem(&self) -> String {
        format!("aqmon-{}-{}", self.city, self.timestamp.format("%Y-%m-%d"))
    }

    /// Write `<stem>.json` and `<stem>.csv` into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let stem = self.file_stem();
        let json_path = dir.join(format!("{stem}.json"));
        let csv_path = dir.join(format!("{stem}.csv"));

        let json = serde_json::to_string_pretty(self).context("Failed to serialize export")?;
        fs::write(&json_path, json)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;

        let file = fs::File::create(&csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        write_csv(&self.historical.air_quality_24h, &self.historical.weather_24h, file)?;

        Ok((json_path, csv_path))
    }
}

/// One CSV line. Either side may be missing when the series differ in length.
#[derive(Debug, Serialize, PartialEq)]
pub struct CsvRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "AQI")]
    pub aqi: Option<u16>,
    #[serde(rename = "PM2.5")]
    pub pm2_5: Option<f64>,
    #[serde(rename = "PM10")]
    pub pm10: Option<f64>,
    #[serde(rename = "NO2")]
    pub no2: Option<f64>,
    #[serde(rename = "O3")]
    pub o3: Option<f64>,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(rename = "Humidity")]
    pub humidity: Option<u8>,
    #[serde(rename = "Pressure")]
    pub pressure: Option<f64>,
    #[serde(rename = "Wind Speed")]
    pub wind_speed: Option<f64>,
}

/// Pair the two series index by index.
pub fn csv_rows(air_quality: &HistoricalSeries, weather: &HistoricalSeries) -> Vec<CsvRow> {
    let air: &[AirQualitySample] = match &air_quality.points {
        SeriesPoints::AirQuality(points) => points,
        SeriesPoints::Weather(_) => &[],
    };
    let wx: &[WeatherSample] = match &weather.points {
        SeriesPoints::Weather(points) => points,
        SeriesPoints::AirQuality(_) => &[],
    };

    (0..air.len().max(wx.len()))
        .map(|i| {
            let a = air.get(i);
            let w = wx.get(i);
            let timestamp = a.map(|a| a.timestamp).or(w.map(|w| w.timestamp));

            CsvRow {
                timestamp: timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
                aqi: a.map(|a| a.aqi_indian),
                pm2_5: a.map(|a| a.pollutants.pm2_5),
                pm10: a.map(|a| a.pollutants.pm10),
                no2: a.map(|a| a.pollutants.no2),
                o3: a.map(|a| a.pollutants.o3),
                temperature: w.map(|w| w.temperature),
                humidity: w.map(|w| w.humidity),
                pressure: w.map(|w| w.pressure),
                wind_speed: w.map(|w| w.wind_speed),
            }
        })
        .collect()
}

pub fn write_csv<W: Write>(
    air_quality: &HistoricalSeries,
    weather: &HistoricalSeries,
    writer: W,
) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for row in csv_rows(air_quality, weather) {
        out.serialize(row).context("Failed to write CSV row")?;
    }
    out.flush().context("Failed to flush CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqmon_core::{Period, SeriesKind, history};
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::SmallRng};

    fn series(kind: SeriesKind) -> HistoricalSeries {
        let now = Utc.with_ymd_and_hms(2024, 11, 5, 12, 0, 0).unwrap();
        history::generate(kind, Period::Day, now, &mut SmallRng::seed_from_u64(3))
    }

    #[test]
    fn rows_pair_series_by_index() {
        let aqi = series(SeriesKind::Aqi);
        let weather = series(SeriesKind::Weather);

        let rows = csv_rows(&aqi, &weather);

        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|r| r.aqi.is_some() && r.temperature.is_some()));
        assert!(rows[24].timestamp.starts_with("2024-11-05T12:00:00"));
    }

    #[test]
    fn missing_side_leaves_blank_cells() {
        let aqi = series(SeriesKind::Aqi);
        let mut weather = series(SeriesKind::Weather);
        if let SeriesPoints::Weather(points) = &mut weather.points {
            points.truncate(10);
        }

        let mut buf = Vec::new();
        write_csv(&aqi, &weather, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Timestamp,AQI,PM2.5,PM10,NO2,O3,Temperature,Humidity,Pressure,Wind Speed"
        );
        assert_eq!(lines.len(), 26);
        assert!(lines[25].ends_with(",,,,"));
        assert!(!lines[1].ends_with(','));
    }

    #[test]
    fn file_names_carry_city_and_date() {
        let snapshot = ExportSnapshot::new(
            City::lookup("mumbai").unwrap(),
            match series(SeriesKind::Aqi).points {
                SeriesPoints::AirQuality(mut p) => p.remove(0),
                SeriesPoints::Weather(_) => unreachable!(),
            },
            match series(SeriesKind::Weather).points {
                SeriesPoints::Weather(mut p) => p.remove(0),
                SeriesPoints::AirQuality(_) => unreachable!(),
            },
            series(SeriesKind::Aqi),
            series(SeriesKind::Weather),
        );

        let stem = snapshot.file_stem();
        assert!(stem.starts_with("aqmon-mumbai-"));
        assert_eq!(stem.len(), "aqmon-mumbai-".len() + 10);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["location"], "Mumbai, India");
        assert_eq!(json["metadata"]["export_version"], "1.0");
        assert_eq!(json["historical"]["weather_24h"]["synthetic"], true);
    }
}
