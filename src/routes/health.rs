use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let backend_result = check_generation_backend(&state).await;
    health
        .services
        .insert("generation_backend".to_string(), backend_result.clone());

    let place_search_result = check_place_search(&state);
    health
        .services
        .insert("place_search".to_string(), place_search_result);

    // Generation falls back locally, so a dead backend only degrades the service
    if backend_result.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_generation_backend(state: &AppState) -> ServiceStatus {
    match state.generator.backend().health_check().await {
        Ok(()) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Generation backend reachable".to_string()),
        },
        Err(e) => {
            log::warn!("Generation backend health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("{} (requests will use fallback itineraries)", e)),
            }
        }
    }
}

fn check_place_search(state: &AppState) -> ServiceStatus {
    match state.place_search {
        Some(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("configured".to_string()),
        },
        None => ServiceStatus {
            status: "not_configured".to_string(),
            details: Some("GOOGLE_MAPS_API_KEY not set".to_string()),
        },
    }
}
