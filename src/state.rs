//! Shared application state handed to every actix worker.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::distance_service::DistanceService;
use crate::services::generation_client::{GenerationClientConfig, OllamaClient};
use crate::services::itinerary_generation_service::{ItineraryGenerationConfig, ItineraryGenerator};
use crate::services::place_search_service::{GooglePlaceSearch, PlaceSearch};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ItineraryGenerator>,
    pub place_search: Option<Arc<dyn PlaceSearch>>,
}

impl AppState {
    pub fn new(generator: ItineraryGenerator, place_search: Option<Arc<dyn PlaceSearch>>) -> Self {
        Self {
            generator: Arc::new(generator),
            place_search,
        }
    }

    /// Wire up the real backends described by the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = OllamaClient::new(GenerationClientConfig {
            base_url: config.llm_base_url.clone(),
            model: config.llm_model.clone(),
            timeout: config.llm_timeout,
        })?;

        let generator = ItineraryGenerator::with_config(
            Arc::new(client),
            ItineraryGenerationConfig {
                timeout: config.llm_timeout,
                max_days: config.max_trip_days,
            },
            DistanceService::new(config.day_start_time),
        );

        let place_search = match &config.google_maps_api_key {
            Some(key) => match GooglePlaceSearch::new(&config.google_maps_base_url, key) {
                Ok(search) => {
                    log::info!("Place search enabled via {}", config.google_maps_base_url);
                    Some(Arc::new(search) as Arc<dyn PlaceSearch>)
                }
                Err(e) => {
                    log::warn!("Place search not available: {}", e);
                    None
                }
            },
            None => {
                log::info!("GOOGLE_MAPS_API_KEY not set, place search disabled");
                None
            }
        };

        Ok(Self::new(generator, place_search))
    }
}
