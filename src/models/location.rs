use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether two points are the same place.
pub const COORDINATE_EPSILON: f64 = 1e-6;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite, with latitude in [-90, 90] and longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn approx_eq(&self, other: &Coordinates, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lng - other.lng).abs() <= epsilon
    }

    /// "lat,lng" as expected by mapping services.
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// A resolved place: what the place search returns and what a trip starts from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Location {
    pub address: String,
    pub coordinates: Coordinates,
}
