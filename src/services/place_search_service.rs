//! Place search backed by the Google Geocoding API.
//!
//! Resolves a free-text query into addresses with coordinates, which the
//! planner uses as the trip's home location.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::location::{Coordinates, Location};

pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum PlaceSearchError {
    #[error("Place search is not configured")]
    NotConfigured,
    #[error("Place search upstream error: {0}")]
    Upstream(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Location>, PlaceSearchError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

#[derive(Clone)]
pub struct GooglePlaceSearch {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlaceSearch {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, PlaceSearchError> {
        if api_key.trim().is_empty() {
            return Err(PlaceSearchError::NotConfigured);
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl PlaceSearch for GooglePlaceSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Location>, PlaceSearchError> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        debug!("Geocoding query \"{}\"", query);

        let response: GeocodeResponse = self
            .http_client
            .get(&url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.status.as_str() {
            "OK" => Ok(response
                .results
                .into_iter()
                .filter(|r| r.geometry.location.is_valid())
                .take(limit)
                .map(|r| Location {
                    address: r.formatted_address,
                    coordinates: r.geometry.location,
                })
                .collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => {
                warn!(
                    "Geocoding returned {}: {}",
                    status,
                    response.error_message.as_deref().unwrap_or("no message")
                );
                Err(PlaceSearchError::Upstream(status.to_string()))
            }
        }
    }
}
