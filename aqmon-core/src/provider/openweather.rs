use std::{fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    City, DashboardError, meteo,
    model::{AirQualitySample, PollutantReading, WeatherSample, round_to},
};

use super::{EnvironmentProvider, HttpClient};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const AIR_POLLUTION_PATH: &str = "/data/2.5/air_pollution";
const WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("http", &self.http)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, http: Arc<dyn HttpClient>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str, DashboardError> {
        self.api_key.as_deref().ok_or_else(|| {
            DashboardError::configuration(
                "No OpenWeatherMap API key configured.\n\
                 Hint: set the API_KEY environment variable or run `aqmon configure`.",
            )
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        city: &City,
        extra: &[(&str, String)],
        what: &str,
    ) -> Result<T, DashboardError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        let mut query = vec![
            ("lat", city.latitude.to_string()),
            ("lon", city.longitude.to_string()),
            ("appid", api_key.to_string()),
        ];
        query.extend(extra.iter().cloned());

        debug!(city = city.key, what, "Requesting OpenWeather data");
        let res = self.http.fetch(&url, &query).await.inspect_err(|e| {
            warn!(city = city.key, what, error = %e, "OpenWeather request failed");
        })?;

        if !res.is_success() {
            warn!(city = city.key, what, status = res.status, "OpenWeather returned an error status");
            return Err(DashboardError::upstream(
                Some(res.status),
                format!("OpenWeather {what} request failed: {}", truncate_body(&res.body)),
            ));
        }

        serde_json::from_str(&res.body).map_err(|e| {
            DashboardError::data_shape(format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwAqiMain {
    aqi: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwComponents {
    co: f64,
    no2: f64,
    o3: f64,
    so2: f64,
    pm2_5: f64,
    pm10: f64,
    nh3: f64,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    dt: i64,
    main: OwAqiMain,
    components: OwComponents,
}

#[derive(Debug, Deserialize)]
struct OwAirPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    /// metres
    visibility: Option<f64>,
}

#[async_trait]
impl EnvironmentProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(city = city.key))]
    async fn air_quality(&self, city: &City) -> Result<AirQualitySample, DashboardError> {
        let parsed: OwAirPollutionResponse =
            self.get_json(AIR_POLLUTION_PATH, city, &[], "air pollution").await?;

        let entry = parsed.list.into_iter().next().ok_or_else(|| {
            DashboardError::data_shape("OpenWeather air pollution response contained no entries")
        })?;

        let c = entry.components;
        let reading = PollutantReading {
            pm2_5: c.pm2_5,
            pm10: c.pm10,
            no2: c.no2,
            o3: c.o3,
            co: c.co,
            so2: c.so2,
            nh3: c.nh3,
        };

        Ok(AirQualitySample::from_reading(unix_to_utc(entry.dt), entry.main.aqi, reading))
    }

    #[instrument(skip_all, fields(city = city.key))]
    async fn weather(&self, city: &City) -> Result<WeatherSample, DashboardError> {
        let parsed: OwCurrentResponse = self
            .get_json(WEATHER_PATH, city, &[("units", "metric".to_string())], "weather")
            .await?;

        let (description, icon, weather_id) = parsed
            .weather
            .first()
            .map(|w| (w.description.clone(), w.icon.clone(), Some(w.id)))
            .unwrap_or_else(|| ("Unknown".to_string(), "01d".to_string(), None));

        let temperature = parsed.main.temp;
        let humidity = parsed.main.humidity;

        Ok(WeatherSample {
            timestamp: unix_to_utc(parsed.dt),
            temperature: round_to(temperature, 1),
            feels_like: round_to(parsed.main.feels_like, 1),
            humidity,
            pressure: parsed.main.pressure,
            wind_speed: round_to(parsed.wind.speed * 3.6, 1),
            wind_direction: parsed.wind.deg.round().rem_euclid(360.0) as u16,
            visibility: round_to(parsed.visibility.unwrap_or(10_000.0) / 1000.0, 1),
            clouds: parsed.clouds.all.min(100),
            description,
            icon,
            weather_id,
            heat_index: Some(round_to(meteo::heat_index(temperature, humidity as f64), 1)),
            dew_point: Some(round_to(meteo::dew_point(temperature, humidity as f64), 1)),
        })
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
