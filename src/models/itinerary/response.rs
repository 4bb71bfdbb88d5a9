use serde::{Deserialize, Serialize};

use super::base::StopCategory;
use crate::models::location::Coordinates;

/// Body returned by `POST /generate-itinerary`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItineraryResponse {
    pub itineraries: Vec<DayPlanResponse>,
    pub generation: GenerationInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DayPlanResponse {
    pub day: u32,
    pub total_distance: String,
    pub total_duration: String,
    pub start_time: String,
    pub end_time: String,
    pub places: Vec<PlaceResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceResponse {
    pub name: String,
    pub description: String,
    pub duration: String,
    pub address: String,
    #[serde(rename = "type")]
    pub category: StopCategory,
    pub coordinates: Coordinates,
}

/// Tells the caller whether the plan came from the model or from fallback synthesis.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationInfo {
    pub source: String,
    pub reason: Option<String>,
    pub detail: Option<String>,
}
