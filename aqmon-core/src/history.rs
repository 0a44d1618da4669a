//! Synthetic historical series.
//!
//! There is no measurement store behind the dashboard, so historical windows are
//! generated: a few sinusoids for the daily and yearly cycles, rush-hour and
//! weekend traffic, the monsoon, and random jitter. The numbers are plausible
//! for Bengaluru and nothing more. Every series is flagged `synthetic`, and the
//! constants below are tuning, not measurements.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc, Weekday};
use rand::Rng;
use tracing::debug;

use crate::{
    meteo,
    model::{
        AirQualitySample, HistoricalSeries, Period, PollutantReading, SeriesKind, SeriesPoints,
        WeatherSample, round_to,
    },
};

/// Indian Standard Time, UTC+05:30.
const IST_OFFSET_MINUTES: i64 = 5 * 60 + 30;
const ELEVATION_M: f64 = 920.0;
const SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;

pub const HUMIDITY_MIN: f64 = 20.0;
pub const HUMIDITY_MAX: f64 = 95.0;

/// Generate a `kind` series covering `period` and ending exactly at `now`.
pub fn generate<R: Rng + ?Sized>(
    kind: SeriesKind,
    period: Period,
    now: DateTime<Utc>,
    rng: &mut R,
) -> HistoricalSeries {
    let times = sample_times(period, now);
    debug!(%kind, %period, points = times.len(), "Generating synthetic series");

    let points = match kind {
        SeriesKind::Aqi => SeriesPoints::AirQuality(
            times
                .iter()
                .enumerate()
                .map(|(index, &ts)| air_quality_point(index, ts, rng))
                .collect(),
        ),
        SeriesKind::Weather => SeriesPoints::Weather(
            times
                .iter()
                .enumerate()
                .map(|(index, &ts)| weather_point(index, ts, rng))
                .collect(),
        ),
    };

    HistoricalSeries {
        kind,
        period,
        interval_hours: period.interval_hours(),
        synthetic: true,
        generated_at: now,
        points,
    }
}

/// Evenly spaced timestamps, oldest first, last one equal to `now`.
pub fn sample_times(period: Period, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let step = Duration::hours(period.interval_hours());
    let count = period.point_count();

    (0..count)
        .map(|i| now - step * (count - 1 - i) as i32)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    /// November to February.
    Winter,
    /// June to September.
    Monsoon,
    Other,
}

impl Season {
    pub fn of_month(month: u32) -> Self {
        match month {
            11 | 12 | 1 | 2 => Season::Winter,
            6..=9 => Season::Monsoon,
            _ => Season::Other,
        }
    }
}

/// Calendar position of a sample in local (IST) time.
#[derive(Debug, Clone, Copy)]
struct LocalClock {
    /// Fractional hour of day, 0.0..24.0.
    hour: f64,
    weekday: Weekday,
    day_of_year: u32,
    season: Season,
}

impl LocalClock {
    fn at(ts: DateTime<Utc>) -> Self {
        let local: NaiveDateTime = (ts + Duration::minutes(IST_OFFSET_MINUTES)).naive_utc();

        Self {
            hour: local.hour() as f64 + local.minute() as f64 / 60.0,
            weekday: local.weekday(),
            day_of_year: local.ordinal(),
            season: Season::of_month(local.month()),
        }
    }

    fn hour_of_day(&self) -> u32 {
        self.hour as u32
    }

    fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }

    fn is_rush_hour(&self) -> bool {
        let h = self.hour_of_day();
        (7..10).contains(&h) || (17..20).contains(&h)
    }

    /// Night and early morning, when the boundary layer traps pollution.
    fn is_inversion_hour(&self) -> bool {
        !(7..22).contains(&self.hour_of_day())
    }

    fn is_daytime(&self) -> bool {
        (6..18).contains(&self.hour_of_day())
    }

    fn monsoon(&self) -> f64 {
        if self.season == Season::Monsoon { 1.0 } else { 0.0 }
    }
}

fn traffic_factor(clock: &LocalClock) -> f64 {
    let rush = if clock.is_rush_hour() { 1.8 } else { 1.0 };
    let weekend = if clock.is_weekend() { 0.6 } else { 1.0 };
    rush * weekend
}

fn seasonal_pollution_factor(season: Season) -> f64 {
    match season {
        Season::Winter => 1.3,
        Season::Monsoon => 0.75,
        Season::Other => 1.0,
    }
}

fn inversion_factor(clock: &LocalClock) -> f64 {
    if clock.is_inversion_hour() { 1.2 } else { 1.0 }
}

/// Ozone without jitter; photochemistry peaks around midday.
fn ozone_baseline(hour: f64) -> f64 {
    45.0 + 30.0 * ((hour - 12.0) * PI / 12.0).cos()
}

fn air_quality_point<R: Rng + ?Sized>(
    index: usize,
    ts: DateTime<Utc>,
    rng: &mut R,
) -> AirQualitySample {
    let clock = LocalClock::at(ts);
    let i = index as f64;
    let traffic = traffic_factor(&clock);

    let base = 2.0 + 0.5 * (0.3 * i).sin();
    let level = base * traffic * seasonal_pollution_factor(clock.season) * inversion_factor(&clock)
        + rng.random_range(-0.3..=0.3);
    let aqi = level.round().clamp(1.0, 5.0) as u8;

    let pm2_5 = (12.0 * aqi as f64 + 5.0 * (0.5 * i).sin() + rng.random_range(-3.0..=3.0)).max(1.0);
    let pm10 = pm2_5 * rng.random_range(1.6..=2.2);
    let no2 = (18.0 * traffic + rng.random_range(-4.0..=4.0)).max(1.0);
    let o3 = (ozone_baseline(clock.hour) + rng.random_range(-5.0..=5.0)).max(1.0);
    let co = (400.0 * traffic + rng.random_range(-50.0..=50.0)).max(50.0);
    let so2 = 6.0 + rng.random_range(0.0..=4.0);
    let nh3 = 4.0 + rng.random_range(0.0..=3.0);

    AirQualitySample::from_reading(
        ts,
        aqi,
        PollutantReading { pm2_5, pm10, no2, o3, co, so2, nh3 },
    )
}

fn weather_point<R: Rng + ?Sized>(index: usize, ts: DateTime<Utc>, rng: &mut R) -> WeatherSample {
    let clock = LocalClock::at(ts);
    let i = index as f64;
    let monsoon = clock.monsoon();

    // warmest in late April, warmest hour mid-afternoon
    let seasonal = 3.5 * (2.0 * PI * (clock.day_of_year as f64 - 110.0) / 365.0).cos();
    let diurnal = 5.0 * (2.0 * PI * (clock.hour - 15.0) / 24.0).cos();
    let temperature = 24.0 + seasonal + diurnal + rng.random_range(-0.8..=0.8);

    let humidity = (65.0 - 2.5 * (temperature - 24.0) + 15.0 * monsoon + rng.random_range(-5.0..=5.0))
        .clamp(HUMIDITY_MIN, HUMIDITY_MAX);

    let pressure = meteo::station_pressure(SEA_LEVEL_PRESSURE_HPA, ELEVATION_M)
        + 2.0 * (0.2 * i).sin()
        + (4.0 * PI * clock.hour / 24.0).cos();

    let wind_speed = (8.0
        + 4.0 * (2.0 * PI * (clock.hour - 9.0) / 24.0).sin()
        + 6.0 * monsoon
        + rng.random_range(-1.5..=1.5))
    .max(0.0);

    // south-west monsoon winds, easterlies the rest of the year
    let wind_direction: f64 = if monsoon > 0.0 {
        250.0 + rng.random_range(-30.0..=30.0)
    } else {
        90.0 + rng.random_range(-40.0..=40.0)
    };

    let cloud_base = if monsoon > 0.0 { 75.0 } else { 25.0 };
    let clouds = (cloud_base + 15.0 * (0.4 * i).sin() + rng.random_range(-10.0..=10.0)).clamp(0.0, 100.0);

    let haze = if clock.season == Season::Winter { 1.0 } else { 0.0 };
    let inversion = if clock.is_inversion_hour() { 1.0 } else { 0.0 };
    let visibility = (10.0 - 3.0 * haze - 1.5 * inversion - 2.5 * monsoon + rng.random_range(-0.5..=0.5))
        .clamp(1.5, 10.0);

    let humidity = humidity.round();
    let clouds = clouds.round() as u8;
    let (description, icon_code, weather_id) = sky(clouds, monsoon > 0.0);
    let icon = format!("{icon_code}{}", if clock.is_daytime() { 'd' } else { 'n' });

    WeatherSample {
        timestamp: ts,
        temperature: round_to(temperature, 1),
        feels_like: round_to(meteo::apparent_temperature(temperature, humidity, wind_speed), 1),
        humidity: humidity as u8,
        pressure: round_to(pressure, 1),
        wind_speed: round_to(wind_speed, 1),
        wind_direction: wind_direction.round().rem_euclid(360.0) as u16,
        visibility: round_to(visibility, 1),
        clouds,
        description: description.to_string(),
        icon,
        weather_id: Some(weather_id),
        heat_index: Some(round_to(meteo::heat_index(temperature, humidity), 1)),
        dew_point: Some(round_to(meteo::dew_point(temperature, humidity), 1)),
    }
}

/// (description, icon prefix, provider condition id)
fn sky(clouds: u8, monsoon: bool) -> (&'static str, &'static str, u16) {
    match clouds {
        70.. if monsoon => ("light rain", "10", 500),
        0..=10 => ("clear sky", "01", 800),
        11..=24 => ("few clouds", "02", 801),
        25..=49 => ("scattered clouds", "03", 802),
        50..=84 => ("broken clouds", "04", 803),
        _ => ("overcast clouds", "04", 804),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::SmallRng};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 9, 30, 0).unwrap()
    }

    fn assert_spacing(times: &[DateTime<Utc>], hours: i64) {
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::hours(hours));
        }
    }

    #[test]
    fn day_series_has_25_hourly_points_ending_now() {
        let mut rng = SmallRng::seed_from_u64(7);
        let series = generate(SeriesKind::Aqi, Period::Day, now(), &mut rng);

        let times = series.points.timestamps();
        assert_eq!(times.len(), 25);
        assert_eq!(times.last(), Some(&now()));
        assert_eq!(times[0], now() - Duration::hours(24));
        assert_spacing(&times, 1);
        assert_eq!(series.interval_hours, 1);
        assert!(series.synthetic);
    }

    #[test]
    fn week_and_month_spacing() {
        let week = sample_times(Period::Week, now());
        assert_spacing(&week, 6);
        assert_eq!(week.last(), Some(&now()));
        assert_eq!(week[0], now() - Duration::days(7));

        let month = sample_times(Period::Month, now());
        assert_spacing(&month, 24);
        assert_eq!(month[0], now() - Duration::days(30));
    }

    #[test]
    fn generated_ordinals_and_humidity_stay_in_bounds() {
        for seed in 0..20u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            for period in [Period::Day, Period::Week, Period::Month] {
                for start in [now(), Utc.with_ymd_and_hms(2024, 12, 20, 2, 0, 0).unwrap()] {
                    match generate(SeriesKind::Aqi, period, start, &mut rng).points {
                        SeriesPoints::AirQuality(points) => {
                            assert!(points.iter().all(|p| (1..=5).contains(&p.aqi)));
                            assert!(points.iter().all(|p| p.aqi_indian <= 500));
                            assert!(points.iter().all(|p| p.health_index <= 100));
                        }
                        other => panic!("expected air quality points, got {other:?}"),
                    }

                    match generate(SeriesKind::Weather, period, start, &mut rng).points {
                        SeriesPoints::Weather(points) => {
                            for p in points {
                                assert!((20..=95).contains(&p.humidity), "humidity {}", p.humidity);
                                assert!(p.clouds <= 100);
                                assert!(p.wind_direction < 360);
                                assert!((1.5..=10.0).contains(&p.visibility));
                            }
                        }
                        other => panic!("expected weather points, got {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn same_seed_same_series() {
        let a = generate(SeriesKind::Weather, Period::Week, now(), &mut SmallRng::seed_from_u64(42));
        let b = generate(SeriesKind::Weather, Period::Week, now(), &mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn wind_follows_the_monsoon() {
        let mut rng = SmallRng::seed_from_u64(11);
        let july = weather_point(0, now(), &mut rng);
        assert!((220..=280).contains(&july.wind_direction), "{}", july.wind_direction);

        let january = Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap();
        for index in 0..20 {
            let p = weather_point(index, january, &mut rng);
            assert!((50..=130).contains(&p.wind_direction), "{}", p.wind_direction);
        }
    }

    #[test]
    fn rush_hours_and_weekends_shape_traffic() {
        // Wednesday 08:30 IST
        let weekday_rush = LocalClock::at(Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap());
        assert_eq!(traffic_factor(&weekday_rush), 1.8);

        // Wednesday 13:30 IST
        let weekday_noon = LocalClock::at(Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap());
        assert_eq!(traffic_factor(&weekday_noon), 1.0);

        // Saturday 18:30 IST
        let weekend_rush = LocalClock::at(Utc.with_ymd_and_hms(2024, 1, 13, 13, 0, 0).unwrap());
        assert!((traffic_factor(&weekend_rush) - 1.08).abs() < 1e-9);
    }

    #[test]
    fn local_clock_uses_indian_standard_time() {
        // 20:00 UTC on Dec 31 is already New Year's Day in India
        let clock = LocalClock::at(Utc.with_ymd_and_hms(2023, 12, 31, 20, 0, 0).unwrap());
        assert_eq!(clock.hour_of_day(), 1);
        assert_eq!(clock.day_of_year, 1);
        assert!(clock.is_inversion_hour());
        assert!(!clock.is_daytime());
    }

    #[test]
    fn seasons() {
        assert_eq!(Season::of_month(1), Season::Winter);
        assert_eq!(Season::of_month(11), Season::Winter);
        assert_eq!(Season::of_month(7), Season::Monsoon);
        assert_eq!(Season::of_month(4), Season::Other);
    }

    #[test]
    fn ozone_peaks_at_midday() {
        let noon = ozone_baseline(12.0);
        assert!(noon > ozone_baseline(6.0));
        assert!(noon > ozone_baseline(18.0));
        assert_eq!(noon, 75.0);
    }

    #[test]
    fn monsoon_clouds_mean_rain() {
        assert_eq!(sky(80, true).0, "light rain");
        assert_eq!(sky(80, false).0, "broken clouds");
        assert_eq!(sky(5, false).0, "clear sky");
    }
}
