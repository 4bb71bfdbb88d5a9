pub mod distance_service;
pub mod fallback_synthesizer;
pub mod generation_client;
pub mod itinerary_generation_service;
pub mod place_search_service;
pub mod prompt_builder;
pub mod response_reconciler;
pub mod route_link_service;
