use serde::{Deserialize, Serialize};

use crate::models::location::{Coordinates, Location, COORDINATE_EPSILON};

pub const ANCHOR_NAME: &str = "Your Accommodation";
pub const ANCHOR_DESCRIPTION: &str = "Start and end your day here";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StopCategory {
    Accommodation,
    Food,
    Attraction,
    Outdoor,
}

impl StopCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopCategory::Accommodation => "accommodation",
            StopCategory::Food => "food",
            StopCategory::Attraction => "attraction",
            StopCategory::Outdoor => "outdoor",
        }
    }

    /// Case-insensitive lookup, `None` for anything outside the four categories.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "accommodation" => Some(StopCategory::Accommodation),
            "food" => Some(StopCategory::Food),
            "attraction" => Some(StopCategory::Attraction),
            "outdoor" => Some(StopCategory::Outdoor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub address: String,
    pub category: StopCategory,
    pub coordinates: Coordinates,
}

impl Stop {
    /// The synthetic start/end stop placed at the traveller's home location.
    pub fn anchor(home: &Location) -> Self {
        Self {
            name: ANCHOR_NAME.to_string(),
            description: ANCHOR_DESCRIPTION.to_string(),
            duration_minutes: 0,
            address: home.address.clone(),
            category: StopCategory::Accommodation,
            coordinates: home.coordinates,
        }
    }

    pub fn is_at(&self, home: &Location) -> bool {
        self.coordinates.approx_eq(&home.coordinates, COORDINATE_EPSILON)
    }
}

/// Display-only figures shown alongside a day. Not derived from `stops` exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub total_distance: String,
    pub total_duration: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub day_index: u32,
    pub stops: Vec<Stop>,
    pub summary: DaySummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub days: Vec<DayPlan>,
}
