//! Derived weather quantities.

/// Dew point in °C (Magnus approximation).
pub fn dew_point(temperature: f64, humidity: f64) -> f64 {
    const A: f64 = 17.27;
    const B: f64 = 237.7;

    let rh = humidity.clamp(1.0, 100.0) / 100.0;
    let gamma = A * temperature / (B + temperature) + rh.ln();
    B * gamma / (A - gamma)
}

/// Steadman apparent temperature in °C, wind in km/h.
pub fn apparent_temperature(temperature: f64, humidity: f64, wind_kmh: f64) -> f64 {
    let vapour_pressure =
        humidity.clamp(0.0, 100.0) / 100.0 * 6.105 * (17.27 * temperature / (237.7 + temperature)).exp();
    let wind_ms = wind_kmh.max(0.0) / 3.6;
    temperature + 0.33 * vapour_pressure - 0.70 * wind_ms - 4.0
}

/// Heat index in °C (Rothfusz regression). Below 27 °C the regression is
/// meaningless and the air temperature is returned as is.
pub fn heat_index(temperature: f64, humidity: f64) -> f64 {
    if temperature < 27.0 {
        return temperature;
    }

    let t = temperature * 9.0 / 5.0 + 32.0;
    let rh = humidity.clamp(0.0, 100.0);
    let hi = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh;

    (hi - 32.0) * 5.0 / 9.0
}

/// Station pressure in hPa at `elevation_m` for a given sea-level pressure.
pub fn station_pressure(sea_level_hpa: f64, elevation_m: f64) -> f64 {
    sea_level_hpa * (1.0 - 2.255_77e-5 * elevation_m).powf(5.255_88)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_air_dew_point_equals_temperature() {
        assert!((dew_point(25.0, 100.0) - 25.0).abs() < 1e-9);
        assert!(dew_point(25.0, 50.0) < 15.0);
    }

    #[test]
    fn heat_index_kicks_in_when_hot_and_humid() {
        assert_eq!(heat_index(22.0, 90.0), 22.0);
        assert!(heat_index(32.0, 70.0) > 32.0);
    }

    #[test]
    fn wind_lowers_apparent_temperature() {
        let calm = apparent_temperature(28.0, 60.0, 0.0);
        let windy = apparent_temperature(28.0, 60.0, 30.0);
        assert!(windy < calm);
    }

    #[test]
    fn bengaluru_station_pressure() {
        let p = station_pressure(1013.25, 920.0);
        assert!((905.0..910.0).contains(&p), "got {p}");
    }
}
