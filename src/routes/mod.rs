pub mod health;
pub mod itinerary;
pub mod places;

use actix_web::{error, web, HttpResponse};
use serde_json::json;

/// Routes shared by the server binary and the integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let body = json!({ "error": err.to_string() });
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .route("/health", web::get().to(health::health_check))
    .route("/generate-itinerary", web::post().to(itinerary::generate))
    .service(
        web::scope("/api")
            .route("/itineraries/generate", web::post().to(itinerary::generate))
            .route("/places/search", web::get().to(places::search)),
    );
}
