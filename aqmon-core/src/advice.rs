//! Health recommendations and alerts for a current air-quality reading.

use serde::Serialize;

use crate::model::AirQualitySample;

const PM25_ALERT_THRESHOLD: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

pub fn recommendations(aqi: u8, pm25: f64) -> Vec<&'static str> {
    let mut out = if aqi <= 2 && pm25 <= 15.0 {
        vec![
            "Air quality is good. Perfect for outdoor activities and exercise.",
            "Great day for jogging, cycling, or outdoor sports.",
        ]
    } else if aqi <= 3 && pm25 <= 35.0 {
        vec![
            "Moderate air quality. Sensitive individuals should limit outdoor exposure.",
            "Consider wearing a mask if you have respiratory conditions.",
        ]
    } else {
        vec![
            "Poor air quality. Avoid prolonged outdoor activities.",
            "Stay indoors and use air purifiers if available.",
            "Wear N95 masks when going outside.",
        ]
    };

    out.push("Keep indoor plants to improve air quality naturally.");
    out
}

pub fn alerts(sample: &AirQualitySample) -> Vec<Alert> {
    let mut out = Vec::new();

    if sample.aqi >= 4 {
        out.push(Alert {
            severity: Severity::Danger,
            message: "Very poor air quality. Avoid outdoor activities and wear protective masks."
                .to_string(),
        });
    } else if sample.aqi >= 3 {
        out.push(Alert {
            severity: Severity::Warning,
            message: "Moderate air quality. Sensitive individuals should limit outdoor exposure."
                .to_string(),
        });
    }

    if sample.pollutants.pm2_5 > PM25_ALERT_THRESHOLD {
        out.push(Alert {
            severity: Severity::Warning,
            message: format!(
                "High PM2.5 levels detected ({} μg/m³). Consider using air purifiers.",
                sample.pollutants.pm2_5
            ),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PollutantReading;
    use chrono::Utc;

    fn sample(aqi: u8, pm2_5: f64) -> AirQualitySample {
        AirQualitySample::from_reading(
            Utc::now(),
            aqi,
            PollutantReading { pm2_5, pm10: pm2_5 * 1.8, ..Default::default() },
        )
    }

    #[test]
    fn good_air_gets_outdoor_advice() {
        let recs = recommendations(1, 8.0);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Air quality is good"));
        assert!(recs.last().unwrap().contains("indoor plants"));
    }

    #[test]
    fn fair_ordinal_with_high_pm25_is_moderate() {
        let recs = recommendations(2, 20.0);
        assert!(recs[0].starts_with("Moderate air quality"));
    }

    #[test]
    fn poor_air_gets_three_warnings() {
        let recs = recommendations(4, 60.0);
        assert_eq!(recs.len(), 4);
        assert!(recs.iter().any(|r| r.contains("N95")));
    }

    #[test]
    fn no_alerts_for_clean_air() {
        assert!(alerts(&sample(2, 12.0)).is_empty());
    }

    #[test]
    fn very_poor_raises_danger_and_pm_warning() {
        let found = alerts(&sample(5, 80.5));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].severity, Severity::Danger);
        assert_eq!(found[1].severity, Severity::Warning);
        assert!(found[1].message.contains("80.5"));
    }

    #[test]
    fn moderate_raises_single_warning() {
        let found = alerts(&sample(3, 30.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Warning);
    }
}
