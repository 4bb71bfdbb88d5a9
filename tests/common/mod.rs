#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use itinerary_api::models::location::{Coordinates, Location};
use itinerary_api::routes;
use itinerary_api::services::distance_service::DistanceService;
use itinerary_api::services::generation_client::{GenerationClientConfig, OllamaClient};
use itinerary_api::services::itinerary_generation_service::{
    ItineraryGenerationConfig, ItineraryGenerator,
};
use itinerary_api::services::place_search_service::{GooglePlaceSearch, PlaceSearch};
use itinerary_api::state::AppState;

pub const HOME_LAT: f64 = 48.8606;
pub const HOME_LNG: f64 = 2.3376;
pub const HOME_ADDRESS: &str = "Rue de Rivoli, 75001 Paris";

/// What the mock generation backend answers to `POST /api/generate`
#[derive(Clone)]
pub enum MockReply {
    /// 200 with `{"response": text}`
    Generate(String),
    /// Bare status code with an error body
    Status(u16),
    /// 200 with a body that is not the expected envelope
    RawBody(String),
    /// Sleep, then answer like `Generate`
    Delayed(Duration, String),
}

/// In-process stand-in for the local generation runtime and the geocoder
pub struct MockBackend {
    pub base_url: String,
    handle: ServerHandle,
}

impl MockBackend {
    pub async fn start(reply: MockReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind mock backend");
        let port = listener.local_addr().expect("mock backend address").port();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(reply.clone()))
                .route("/api/generate", web::post().to(mock_generate))
                .route("/api/tags", web::get().to(mock_tags))
                .route("/maps/api/geocode/json", web::get().to(mock_geocode))
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .expect("Failed to start mock backend")
        .run();

        let handle = server.handle();
        actix_rt::spawn(server);

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            handle,
        }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn mock_generate(reply: web::Data<MockReply>, body: web::Json<Value>) -> impl Responder {
    // Reject anything that doesn't look like a non-streaming generate call
    let well_formed = body["model"].is_string()
        && body["prompt"].is_string()
        && body["stream"] == Value::Bool(false);
    if !well_formed {
        return HttpResponse::UnprocessableEntity().json(json!({ "error": "bad request body" }));
    }

    match reply.get_ref() {
        MockReply::Generate(text) => HttpResponse::Ok().json(json!({ "response": text, "done": true })),
        MockReply::Status(code) => HttpResponse::build(
            actix_web::http::StatusCode::from_u16(*code).expect("valid status code"),
        )
        .json(json!({ "error": "model failed" })),
        MockReply::RawBody(body) => HttpResponse::Ok()
            .content_type("text/plain")
            .body(body.clone()),
        MockReply::Delayed(delay, text) => {
            actix_web::rt::time::sleep(*delay).await;
            HttpResponse::Ok().json(json!({ "response": text, "done": true }))
        }
    }
}

async fn mock_tags() -> impl Responder {
    HttpResponse::Ok().json(json!({ "models": [{ "name": "llama2:latest" }] }))
}

#[derive(Deserialize)]
struct GeocodeQuery {
    address: String,
    key: String,
}

async fn mock_geocode(query: web::Query<GeocodeQuery>) -> impl Responder {
    if query.key != "test-key" {
        return HttpResponse::Ok().json(json!({ "status": "REQUEST_DENIED", "error_message": "bad key" }));
    }
    if query.address == "nowhere" {
        return HttpResponse::Ok().json(json!({ "status": "ZERO_RESULTS", "results": [] }));
    }
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "results": [
            {
                "formatted_address": format!("{}, Paris, France", query.address),
                "geometry": { "location": { "lat": HOME_LAT, "lng": HOME_LNG } }
            },
            {
                "formatted_address": format!("{}, Paris, Texas", query.address),
                "geometry": { "location": { "lat": 33.6609, "lng": -95.5555 } }
            }
        ]
    }))
}

/// A base URL nothing is listening on
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to reserve port");
    let port = listener.local_addr().expect("reserved address").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn home() -> Location {
    Location {
        address: HOME_ADDRESS.to_string(),
        coordinates: Coordinates::new(HOME_LAT, HOME_LNG),
    }
}

pub fn ollama_client(base_url: &str, timeout: Duration) -> OllamaClient {
    OllamaClient::new(GenerationClientConfig {
        base_url: base_url.to_string(),
        model: "llama2".to_string(),
        timeout,
    })
    .expect("Failed to build generation client")
}

pub fn generator(base_url: &str, timeout: Duration) -> ItineraryGenerator {
    ItineraryGenerator::with_config(
        Arc::new(ollama_client(base_url, timeout)),
        ItineraryGenerationConfig {
            timeout,
            max_days: 14,
        },
        DistanceService::default(),
    )
}

pub fn app_state(base_url: &str, place_search_base_url: Option<&str>) -> AppState {
    let place_search = place_search_base_url.map(|url| {
        Arc::new(GooglePlaceSearch::new(url, "test-key").expect("place search client"))
            as Arc<dyn PlaceSearch>
    });
    AppState::new(generator(base_url, Duration::from_secs(5)), place_search)
}

pub fn create_app(
    state: AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(routes::configure)
}

pub fn place(name: &str, lat: f64, lng: f64) -> Value {
    json!({
        "name": name,
        "description": format!("A visit to {}", name),
        "duration": "1.5 hours",
        "address": format!("{} street, Paris", name),
        "type": "attraction",
        "coordinates": { "lat": lat, "lng": lng }
    })
}

/// Model output in the shape the prompt asks for, wrapped in chatty prose
pub fn model_output(days: usize, places_per_day: usize) -> String {
    let itineraries: Vec<Value> = (0..days)
        .map(|d| {
            json!({
                "day": d + 1,
                "totalDistance": "7.5 km",
                "totalDuration": "8 hours",
                "startTime": "9:00 AM",
                "endTime": "5:00 PM",
                "places": (0..places_per_day)
                    .map(|p| place(&format!("Spot {}-{}", d + 1, p + 1), 48.85 + p as f64 * 0.002, 2.34))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    format!(
        "Here is your personalised plan!\n\n{}\n\nHope you enjoy Paris!",
        json!({ "itineraries": itineraries })
    )
}

pub fn generate_body(days: i64, modes: &[&str]) -> Value {
    json!({
        "location": {
            "address": HOME_ADDRESS,
            "coordinates": { "lat": HOME_LAT, "lng": HOME_LNG }
        },
        "days": days,
        "transportModes": modes
    })
}
