use std::{fmt::Debug, sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;

use crate::{
    City, Config, DashboardError,
    model::{AirQualitySample, WeatherSample},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

const USER_AGENT: &str = concat!("aqmon/", env!("CARGO_PKG_VERSION"));

/// Current conditions source.
#[async_trait]
pub trait EnvironmentProvider: Send + Sync + Debug {
    async fn air_quality(&self, city: &City) -> Result<AirQualitySample, DashboardError>;

    async fn weather(&self, city: &City) -> Result<WeatherSample, DashboardError>;

    /// Whether a credential is present. Requests fail fast when it is not.
    fn is_configured(&self) -> bool;
}

/// Raw response from an outbound GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP seam. Implemented for [`reqwest::Client`]; tests swap in a stub.
#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, DashboardError>;
}

#[async_trait]
impl HttpClient for reqwest::Client {
    async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, DashboardError> {
        // the query carries the credential, keep the url out of error text
        let res = reqwest::Client::get(self, url)
            .query(query)
            .send()
            .await
            .map_err(|e| network_error(e.without_url()))?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| network_error(e.without_url()))?;

        Ok(HttpResponse { status, body })
    }
}

fn network_error(err: reqwest::Error) -> DashboardError {
    DashboardError::upstream(err.status().map(|s| s.as_u16()), err.to_string())
}

/// Construct the OpenWeather provider from config. A missing API key is not an
/// error here: the provider reports it on first use, before any network call.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")?;

    Ok(OpenWeatherProvider::new(config.api_key.clone(), Arc::new(http))
        .with_base_url(config.upstream.base_url.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let ok = HttpResponse { status: 204, body: String::new() };
        let not_found = HttpResponse { status: 404, body: String::new() };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }

    #[test]
    fn provider_from_config_without_key_is_unconfigured() {
        let cfg = Config::default();
        let provider = provider_from_config(&cfg).expect("client builds without a key");
        assert!(!provider.is_configured());
    }

    #[test]
    fn provider_from_config_with_key_is_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        let provider = provider_from_config(&cfg).expect("client builds");
        assert!(provider.is_configured());
    }
}
