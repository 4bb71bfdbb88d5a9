//! Distance Service
//!
//! Best-effort distance and timing estimates for a day's stop sequence. These
//! back the display-only summary fields whenever the generation backend leaves
//! them out, and they are the only figures a synthesized fallback day has.
//! Distances are straight-line (Haversine) so nothing here touches the network.

use chrono::{Duration, NaiveTime};

use crate::models::itinerary::{DaySummary, Stop};
use crate::models::itinerary::transforms::format_minutes;
use crate::models::location::Coordinates;
use crate::models::trip::TransportMode;

const EARTH_RADIUS_KM: f64 = 6371.0;
const DEFAULT_DAY_START_HOUR: u32 = 9;

/// Great-circle distance between two points in kilometres
pub fn haversine_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone)]
pub struct DistanceService {
    day_start: NaiveTime,
}

impl Default for DistanceService {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(DEFAULT_DAY_START_HOUR, 0, 0)
                .unwrap_or_default(),
        }
    }
}

impl DistanceService {
    pub fn new(day_start: NaiveTime) -> Self {
        Self { day_start }
    }

    /// Sum of leg lengths along the stops in the order given
    pub fn path_distance_km(&self, stops: &[Stop]) -> f64 {
        stops
            .windows(2)
            .map(|leg| haversine_km(&leg[0].coordinates, &leg[1].coordinates))
            .sum()
    }

    pub fn travel_minutes(&self, distance_km: f64, mode: TransportMode) -> u32 {
        (distance_km / mode.average_speed_kmh() * 60.0).round() as u32
    }

    pub fn estimate(&self, stops: &[Stop], mode: TransportMode) -> DaySummary {
        let distance_km = self.path_distance_km(stops);
        let visit_minutes = stops
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.duration_minutes));
        let total_minutes = visit_minutes.saturating_add(self.travel_minutes(distance_km, mode));
        let end = self.day_start + Duration::minutes(total_minutes as i64);

        DaySummary {
            total_distance: format!("{:.1} km", distance_km),
            total_duration: format_minutes(total_minutes),
            start_time: format_clock(self.day_start),
            end_time: format_clock(end),
        }
    }
}

/// "9:00 AM" style clock time
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
