//! HTTP client for a running `aqmon` server, with bounded retries and a
//! last-good-value cache for polling.

use std::{future::Future, time::Duration};

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use aqmon_core::{AirQualitySample, HistoricalSeries, Period, SeriesKind, WeatherSample};

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// Linear backoff: attempt `n` waits `n * base_delay` before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
/// The last error is returned.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => {
                return Err(err.context(format!("{what} failed after {attempts} attempts")));
            }
            Err(err) => {
                let delay = policy.delay_after(attempt);
                warn!(attempt, error = %err, "{what} failed, retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("aqmon-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    pub async fn air_quality(&self, city: Option<&str>) -> Result<AirQualitySample> {
        self.get_json("/air-quality", &city_query(city)).await
    }

    pub async fn weather(&self, city: Option<&str>) -> Result<WeatherSample> {
        self.get_json("/weather", &city_query(city)).await
    }

    pub async fn historical(&self, kind: SeriesKind, period: Period) -> Result<HistoricalSeries> {
        let path = format!("/historical/{kind}");
        self.get_json(&path, &[("period", period.to_string())]).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        with_retry(self.retry, &format!("GET {path}"), || self.fetch_once(&url, query)).await
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(url, "Requesting");
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Could not reach {url}"))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read response body")?;

        if !status.is_success() {
            return Err(anyhow!("Server answered {status}: {}", error_message(&body)));
        }

        serde_json::from_str(&body).with_context(|| format!("Unexpected response from {url}"))
    }
}

fn city_query(city: Option<&str>) -> Vec<(&'static str, String)> {
    city.map(|c| vec![("city", c.to_string())]).unwrap_or_default()
}

/// `error` and `details` from the server's error body, or the raw body.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    match (value["error"].as_str(), value["details"].as_str()) {
        (Some(error), Some(details)) => format!("{error} ({details})"),
        (Some(error), None) => error.to_string(),
        _ => body.trim().to_string(),
    }
}

/// Outcome of one poll, after falling back to the cache if needed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    Fresh(T),
    /// The fetch failed; this is the last value that succeeded.
    Stale(T),
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct ReadingCache<T> {
    last: Option<T>,
}

impl<T> Default for ReadingCache<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: Clone> ReadingCache<T> {
    pub fn update(&mut self, result: Result<T>) -> Reading<T> {
        match result {
            Ok(value) => {
                self.last = Some(value.clone());
                Reading::Fresh(value)
            }
            Err(err) => match &self.last {
                Some(value) => {
                    warn!(error = %err, "Fetch failed, showing cached data");
                    Reading::Stale(value.clone())
                }
                None => Reading::Unavailable(format!("{err:#}")),
            },
        }
    }
}
