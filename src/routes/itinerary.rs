use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::models::itinerary::response::ItineraryResponse;
use crate::models::trip::GenerateItineraryRequest;
use crate::state::AppState;

/*
    /generate-itinerary
    /api/itineraries/generate
*/
pub async fn generate(
    state: web::Data<AppState>,
    input: web::Json<GenerateItineraryRequest>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    let generator = &state.generator;

    let trip = match input.into_inner().into_trip_request(generator.config().max_days) {
        Ok(trip) => trip,
        Err(err) => {
            warn!("[{}] Rejected itinerary request: {}", request_id, err);
            return HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
        }
    };

    info!(
        "[{}] Generating {} day itinerary for {} ({})",
        request_id,
        trip.day_count(),
        trip.home().address,
        trip.transport_modes()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let outcome = generator.generate(&trip).await;
    match outcome.fallback_reason() {
        Some(reason) => info!("[{}] Responding with fallback itinerary ({})", request_id, reason.kind()),
        None => info!("[{}] Responding with generated itinerary", request_id),
    }

    HttpResponse::Ok().json(ItineraryResponse::from_outcome(&outcome, trip.primary_mode()))
}
