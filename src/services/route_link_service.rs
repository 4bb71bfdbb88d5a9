//! Deep links into an external mapping service for a day's stop sequence.

use url::Url;

use crate::models::itinerary::Stop;
use crate::models::trip::TransportMode;

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// Google Maps directions link: first stop as origin, last as destination,
/// everything in between as waypoints in the given order.
pub fn directions_url(stops: &[Stop], mode: TransportMode) -> Option<Url> {
    if stops.len() < 2 {
        return None;
    }

    let origin = &stops[0];
    let destination = &stops[stops.len() - 1];
    let waypoints = stops[1..stops.len() - 1]
        .iter()
        .map(|stop| stop.coordinates.to_query_value())
        .collect::<Vec<_>>()
        .join("|");

    let mut url = Url::parse(DIRECTIONS_BASE_URL).ok()?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("api", "1")
            .append_pair("origin", &origin.coordinates.to_query_value())
            .append_pair("destination", &destination.coordinates.to_query_value())
            .append_pair("travelmode", mode.as_str());
        if !waypoints.is_empty() {
            query.append_pair("waypoints", &waypoints);
        }
    }

    Some(url)
}
