use super::base::{DayPlan, Itinerary, Stop};
use super::response::{DayPlanResponse, GenerationInfo, ItineraryResponse, PlaceResponse};
use crate::models::trip::TransportMode;
use crate::services::itinerary_generation_service::GenerationOutcome;
use crate::services::route_link_service;

/// Human readable duration in the style the planner UI shows: "45 min", "2 hours", "1 hour 30 min".
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    let hour_part = match hours {
        0 => None,
        1 => Some("1 hour".to_string()),
        h => Some(format!("{} hours", h)),
    };

    match (hour_part, rest) {
        (None, m) => format!("{} min", m),
        (Some(h), 0) => h,
        (Some(h), m) => format!("{} {} min", h, m),
    }
}

impl From<&Stop> for PlaceResponse {
    fn from(stop: &Stop) -> Self {
        PlaceResponse {
            name: stop.name.clone(),
            description: stop.description.clone(),
            duration: format_minutes(stop.duration_minutes),
            address: stop.address.clone(),
            category: stop.category,
            coordinates: stop.coordinates,
        }
    }
}

impl DayPlan {
    pub fn to_response(&self, mode: TransportMode) -> DayPlanResponse {
        DayPlanResponse {
            day: self.day_index,
            total_distance: self.summary.total_distance.clone(),
            total_duration: self.summary.total_duration.clone(),
            start_time: self.summary.start_time.clone(),
            end_time: self.summary.end_time.clone(),
            places: self.stops.iter().map(PlaceResponse::from).collect(),
            maps_url: route_link_service::directions_url(&self.stops, mode).map(|u| u.to_string()),
        }
    }
}

impl Itinerary {
    pub fn to_day_responses(&self, mode: TransportMode) -> Vec<DayPlanResponse> {
        self.days.iter().map(|day| day.to_response(mode)).collect()
    }
}

impl ItineraryResponse {
    pub fn from_outcome(outcome: &GenerationOutcome, mode: TransportMode) -> Self {
        let generation = match outcome {
            GenerationOutcome::Generated(_) => GenerationInfo {
                source: "generated".to_string(),
                reason: None,
                detail: None,
            },
            GenerationOutcome::FallbackUsed { reason, .. } => GenerationInfo {
                source: "fallback".to_string(),
                reason: Some(reason.kind().to_string()),
                detail: Some(reason.to_string()),
            },
        };

        ItineraryResponse {
            itineraries: outcome.itinerary().to_day_responses(mode),
            generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::base::{DaySummary, StopCategory};
    use crate::models::location::{Coordinates, Location};

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0 min");
        assert_eq!(format_minutes(45), "45 min");
        assert_eq!(format_minutes(60), "1 hour");
        assert_eq!(format_minutes(90), "1 hour 30 min");
        assert_eq!(format_minutes(120), "2 hours");
        assert_eq!(format_minutes(185), "3 hours 5 min");
    }

    #[test]
    fn test_day_response_shape() {
        let home = Location {
            address: "Home".to_string(),
            coordinates: Coordinates::new(10.0, 20.0),
        };
        let museum = Stop {
            name: "Museum".to_string(),
            description: "Art".to_string(),
            duration_minutes: 120,
            address: "1 Museum Rd".to_string(),
            category: StopCategory::Attraction,
            coordinates: Coordinates::new(10.001, 20.001),
        };
        let day = DayPlan {
            day_index: 1,
            stops: vec![Stop::anchor(&home), museum, Stop::anchor(&home)],
            summary: DaySummary {
                total_distance: "0.3 km".to_string(),
                total_duration: "2 hours 4 min".to_string(),
                start_time: "9:00 AM".to_string(),
                end_time: "11:04 AM".to_string(),
            },
        };

        let response = day.to_response(TransportMode::Walking);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["day"], 1);
        assert_eq!(json["totalDistance"], "0.3 km");
        assert_eq!(json["places"][0]["type"], "accommodation");
        assert_eq!(json["places"][0]["duration"], "0 min");
        assert_eq!(json["places"][1]["duration"], "2 hours");
        assert!(json["mapsUrl"].as_str().unwrap().contains("travelmode=walking"));
    }
}
