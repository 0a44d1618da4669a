use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use aqmon_core::{
    AirQualitySample, City, Comparison, CurrentConditions, Dashboard, HistoricalSeries, Period,
    SeriesKind, VERSION, WeatherSample,
};

use crate::ApiError;

type SharedDashboard = State<Arc<Dashboard>>;

/// Query extraction whose failure is reported as a JSON `invalid_request`.
type QueryParams<T> = Result<Query<T>, QueryRejection>;

#[derive(Debug, Default, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

pub fn router() -> Router<Arc<Dashboard>> {
    Router::new()
        .route("/air-quality", get(get_air_quality))
        .route("/weather", get(get_weather))
        .route("/current", get(get_current))
        .route("/historical/{kind}", get(get_historical))
        .route("/cities", get(get_cities))
        .route("/cities/compare", get(get_comparison))
        .route("/status", get(get_status))
}

async fn get_air_quality(
    State(dashboard): SharedDashboard,
    query: QueryParams<CityQuery>,
) -> Result<Json<AirQualitySample>, ApiError> {
    let Query(query) = query?;
    Ok(Json(dashboard.air_quality(query.city.as_deref()).await?))
}

async fn get_weather(
    State(dashboard): SharedDashboard,
    query: QueryParams<CityQuery>,
) -> Result<Json<WeatherSample>, ApiError> {
    let Query(query) = query?;
    Ok(Json(dashboard.weather(query.city.as_deref()).await?))
}

async fn get_current(
    State(dashboard): SharedDashboard,
    query: QueryParams<CityQuery>,
) -> Result<Json<CurrentConditions>, ApiError> {
    let Query(query) = query?;
    Ok(Json(dashboard.current(query.city.as_deref()).await?))
}

async fn get_historical(
    State(dashboard): SharedDashboard,
    Path(kind): Path<String>,
    query: QueryParams<PeriodQuery>,
) -> Result<Json<HistoricalSeries>, ApiError> {
    let Query(query) = query?;
    let kind: SeriesKind = kind.parse()?;
    let period = match query.period.as_deref() {
        Some(p) => p.parse()?,
        None => Period::default(),
    };

    Ok(Json(dashboard.historical(kind, period)))
}

async fn get_cities() -> Json<Value> {
    Json(json!({ "cities": City::all() }))
}

async fn get_comparison(State(dashboard): SharedDashboard) -> Result<Json<Comparison>, ApiError> {
    Ok(Json(dashboard.compare().await?))
}

async fn get_status(State(dashboard): SharedDashboard) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "configured": dashboard.is_configured(),
        "default_city": dashboard.default_city().key,
        "version": VERSION,
    }))
}
