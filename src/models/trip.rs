use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::location::{Coordinates, Location};

pub const MIN_TRIP_DAYS: u32 = 1;
pub const DEFAULT_MAX_TRIP_DAYS: u32 = 14;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walking,
    Transit,
    Bicycling,
    Driving,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Transit => "transit",
            TransportMode::Bicycling => "bicycling",
            TransportMode::Driving => "driving",
        }
    }

    /// Rough door-to-door speed in km/h, used for summary estimates only
    pub fn average_speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Walking => 4.5,
            TransportMode::Bicycling => 15.0,
            TransportMode::Transit => 20.0,
            TransportMode::Driving => 30.0,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walking" => Ok(TransportMode::Walking),
            "transit" => Ok(TransportMode::Transit),
            "bicycling" => Ok(TransportMode::Bicycling),
            "driving" => Ok(TransportMode::Driving),
            _ => Err(RequestError::UnknownTransportMode(s.to_string())),
        }
    }
}

/// Caller contract violations. These are rejected before any backend call.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("Home location coordinates ({lat}, {lng}) are out of range")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("Home location address must not be empty")]
    EmptyAddress,
    #[error("Day count {got} must be between {min} and {max}")]
    DayCountOutOfRange { got: i64, min: u32, max: u32 },
    #[error("At least one transport mode is required")]
    NoTransportModes,
    #[error("Unknown transport mode: {0}")]
    UnknownTransportMode(String),
}

/// A validated generation request. Immutable once built.
#[derive(Debug, Clone)]
pub struct TripRequest {
    home: Location,
    day_count: u32,
    transport_modes: Vec<TransportMode>,
}

impl TripRequest {
    pub fn new(
        home: Location,
        day_count: i64,
        transport_modes: Vec<TransportMode>,
        max_days: u32,
    ) -> Result<Self, RequestError> {
        if !home.coordinates.is_valid() {
            return Err(RequestError::InvalidCoordinates {
                lat: home.coordinates.lat,
                lng: home.coordinates.lng,
            });
        }
        if home.address.trim().is_empty() {
            return Err(RequestError::EmptyAddress);
        }
        if day_count < MIN_TRIP_DAYS as i64 || day_count > max_days as i64 {
            return Err(RequestError::DayCountOutOfRange {
                got: day_count,
                min: MIN_TRIP_DAYS,
                max: max_days,
            });
        }

        // Set semantics, caller order preserved
        let mut modes: Vec<TransportMode> = Vec::with_capacity(transport_modes.len());
        for mode in transport_modes {
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        if modes.is_empty() {
            return Err(RequestError::NoTransportModes);
        }

        Ok(Self {
            home,
            day_count: day_count as u32,
            transport_modes: modes,
        })
    }

    pub fn home(&self) -> &Location {
        &self.home
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn transport_modes(&self) -> &[TransportMode] {
        &self.transport_modes
    }

    /// First listed mode; drives travel estimates and the map link.
    pub fn primary_mode(&self) -> TransportMode {
        self.transport_modes[0]
    }

    /// Stable per-request value used to seed fallback synthesis.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.home.address.hash(&mut hasher);
        self.home.coordinates.lat.to_bits().hash(&mut hasher);
        self.home.coordinates.lng.to_bits().hash(&mut hasher);
        self.day_count.hash(&mut hasher);
        self.transport_modes.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocationPayload {
    pub address: String,
    pub coordinates: Coordinates,
}

/// Body of `POST /generate-itinerary`
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateItineraryRequest {
    pub location: LocationPayload,
    pub days: i64,
    pub transport_modes: Vec<String>,
}

impl GenerateItineraryRequest {
    pub fn into_trip_request(self, max_days: u32) -> Result<TripRequest, RequestError> {
        let modes = self
            .transport_modes
            .iter()
            .map(|m| m.parse::<TransportMode>())
            .collect::<Result<Vec<_>, _>>()?;

        TripRequest::new(
            Location {
                address: self.location.address,
                coordinates: self.location.coordinates,
            },
            self.days,
            modes,
            max_days,
        )
    }
}
