use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::{
    City, Config, DashboardError,
    aqi::AqiCategory,
    history,
    model::{
        AirQualitySample, CityComparison, Comparison, CurrentConditions, HistoricalSeries, Period,
        SeriesKind, WeatherSample,
    },
    provider::{EnvironmentProvider, provider_from_config},
};

/// Request-level operations behind every dashboard surface (HTTP API and CLI).
///
/// Holds no mutable state; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Dashboard {
    provider: Arc<dyn EnvironmentProvider>,
    default_city: &'static City,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn EnvironmentProvider>, default_city: &'static City) -> Self {
        Self { provider, default_city }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        let default_city = config.default_city()?;

        if !config.is_configured() {
            warn!("API key not configured; current-conditions requests will fail");
        }

        Ok(Self::new(Arc::new(provider), default_city))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub fn default_city(&self) -> &'static City {
        self.default_city
    }

    /// Resolve an optional city key, defaulting to the configured city.
    pub fn resolve_city(&self, key: Option<&str>) -> Result<&'static City, DashboardError> {
        match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => City::lookup(key),
            None => Ok(self.default_city),
        }
    }

    #[instrument(skip(self))]
    pub async fn air_quality(&self, city: Option<&str>) -> Result<AirQualitySample, DashboardError> {
        let city = self.resolve_city(city)?;
        self.provider.air_quality(city).await
    }

    #[instrument(skip(self))]
    pub async fn weather(&self, city: Option<&str>) -> Result<WeatherSample, DashboardError> {
        let city = self.resolve_city(city)?;
        self.provider.weather(city).await
    }

    /// Air quality and weather for one city, fetched concurrently.
    #[instrument(skip(self))]
    pub async fn current(&self, city: Option<&str>) -> Result<CurrentConditions, DashboardError> {
        let city = self.resolve_city(city)?;

        let (air_quality, weather) =
            tokio::try_join!(self.provider.air_quality(city), self.provider.weather(city))?;

        Ok(CurrentConditions { city: city.key.to_string(), air_quality, weather })
    }

    /// Synthetic series for the primary location. See [`crate::history`].
    pub fn historical(&self, kind: SeriesKind, period: Period) -> HistoricalSeries {
        history::generate(kind, period, Utc::now(), &mut rand::rng())
    }

    /// Current AQI and temperature for every registered city.
    ///
    /// Cities whose fetch fails are left out; only when every city fails is the
    /// first error returned.
    #[instrument(skip(self))]
    pub async fn compare(&self) -> Result<Comparison, DashboardError> {
        let fetches = City::all().iter().map(|city| async move {
            let result = tokio::try_join!(self.provider.air_quality(city), self.provider.weather(city));
            (city, result)
        });

        let mut cities = Vec::new();
        let mut first_error = None;

        for (city, result) in join_all(fetches).await {
            match result {
                Ok((air, weather)) => cities.push(CityComparison {
                    city: city.key.to_string(),
                    name: city.name.to_string(),
                    aqi_indian: air.aqi_indian,
                    temperature: weather.temperature.round(),
                    status: AqiCategory::from_indian(air.aqi_indian).label().to_string(),
                }),
                Err(err) => {
                    warn!(city = city.key, error = %err, "Skipping city in comparison");
                    first_error.get_or_insert(err);
                }
            }
        }

        if cities.is_empty() {
            return Err(first_error
                .unwrap_or_else(|| DashboardError::invalid_request("No cities registered")));
        }

        info!(cities = cities.len(), "Built city comparison");
        Ok(Comparison { cities, generated_at: Utc::now() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pollutant, PollutantReading, SeriesPoints};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed readings; optionally fails for one city or for everything.
    #[derive(Debug, Default)]
    struct FakeProvider {
        configured: bool,
        failing_city: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn configured() -> Self {
            Self { configured: true, ..Default::default() }
        }

        fn check(&self, city: &City) -> Result<(), DashboardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.configured {
                return Err(DashboardError::configuration("no key"));
            }
            if self.failing_city.is_some_and(|k| k == city.key || k == "*") {
                return Err(DashboardError::upstream(Some(503), format!("{} down", city.key)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EnvironmentProvider for FakeProvider {
        async fn air_quality(&self, city: &City) -> Result<AirQualitySample, DashboardError> {
            self.check(city)?;
            let pm2_5 = city.latitude;
            Ok(AirQualitySample::from_reading(
                Utc::now(),
                2,
                PollutantReading { pm2_5, pm10: 40.0, ..Default::default() },
            ))
        }

        async fn weather(&self, city: &City) -> Result<WeatherSample, DashboardError> {
            self.check(city)?;
            Ok(WeatherSample {
                timestamp: Utc::now(),
                temperature: 26.6,
                feels_like: 27.0,
                humidity: 60,
                pressure: 1010.0,
                wind_speed: 10.0,
                wind_direction: 90,
                visibility: 8.0,
                clouds: 20,
                description: "few clouds".into(),
                icon: "02d".into(),
                weather_id: Some(801),
                heat_index: None,
                dew_point: None,
            })
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    fn dashboard(provider: FakeProvider) -> Dashboard {
        Dashboard::new(Arc::new(provider), City::primary())
    }

    #[test]
    fn resolve_city_defaults_and_validates() {
        let d = dashboard(FakeProvider::configured());

        assert_eq!(d.resolve_city(None).unwrap().key, "bengaluru");
        assert_eq!(d.resolve_city(Some("")).unwrap().key, "bengaluru");
        assert_eq!(d.resolve_city(Some("Delhi")).unwrap().key, "delhi");
        assert_eq!(d.resolve_city(Some("nowhere")).unwrap_err().kind(), "invalid_request");
    }

    #[tokio::test]
    async fn current_combines_both_readings() {
        let d = dashboard(FakeProvider::configured());
        let current = d.current(Some("chennai")).await.expect("fake provider succeeds");

        assert_eq!(current.city, "chennai");
        assert_eq!(current.air_quality.dominant_pollutant, Pollutant::Pm10);
        assert_eq!(current.weather.temperature, 26.6);
    }

    #[tokio::test]
    async fn unknown_city_never_reaches_provider() {
        let provider = Arc::new(FakeProvider::configured());
        let d = Dashboard::new(provider.clone(), City::primary());

        assert!(d.air_quality(Some("atlantis")).await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn compare_skips_failing_cities() {
        let d = dashboard(FakeProvider { failing_city: Some("delhi"), ..FakeProvider::configured() });
        let comparison = d.compare().await.expect("other cities succeed");

        assert_eq!(comparison.cities.len(), City::all().len() - 1);
        assert!(comparison.cities.iter().all(|c| c.city != "delhi"));

        let bengaluru = &comparison.cities[0];
        assert_eq!(bengaluru.name, "Bengaluru");
        assert_eq!(bengaluru.temperature, 27.0);
        assert_eq!(bengaluru.status, AqiCategory::from_indian(bengaluru.aqi_indian).label());
    }

    #[tokio::test]
    async fn compare_fails_when_every_city_fails() {
        let d = dashboard(FakeProvider::default());
        let err = d.compare().await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn historical_is_synthetic() {
        let d = dashboard(FakeProvider::default());
        let series = d.historical(SeriesKind::Weather, Period::Week);

        assert!(series.synthetic);
        assert_eq!(series.points.len(), Period::Week.point_count());
        assert!(matches!(series.points, SeriesPoints::Weather(_)));
    }
}
