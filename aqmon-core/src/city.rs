use serde::Serialize;

use crate::DashboardError;

/// A monitored location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub key: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

pub const DEFAULT_CITY: &str = "bengaluru";

const CITIES: &[City] = &[
    City { key: "bengaluru", name: "Bengaluru", latitude: 12.9716, longitude: 77.5946 },
    City { key: "mumbai", name: "Mumbai", latitude: 19.0760, longitude: 72.8777 },
    City { key: "delhi", name: "Delhi", latitude: 28.7041, longitude: 77.1025 },
    City { key: "chennai", name: "Chennai", latitude: 13.0827, longitude: 80.2707 },
    City { key: "kolkata", name: "Kolkata", latitude: 22.5726, longitude: 88.3639 },
    City { key: "hyderabad", name: "Hyderabad", latitude: 17.3850, longitude: 78.4867 },
    City { key: "pune", name: "Pune", latitude: 18.5204, longitude: 73.8567 },
    City { key: "ahmedabad", name: "Ahmedabad", latitude: 23.0225, longitude: 72.5714 },
];

impl City {
    pub fn all() -> &'static [City] {
        CITIES
    }

    /// Case-insensitive lookup by key.
    pub fn lookup(key: &str) -> Result<&'static City, DashboardError> {
        let wanted = key.trim().to_lowercase();
        CITIES.iter().find(|c| c.key == wanted).ok_or_else(|| {
            let known: Vec<&str> = CITIES.iter().map(|c| c.key).collect();
            DashboardError::invalid_request(format!(
                "Unknown city '{key}'. Supported cities: {}.",
                known.join(", ")
            ))
        })
    }

    pub fn primary() -> &'static City {
        &CITIES[0]
    }
}
