//! Itinerary Generation Service
//!
//! Drives one request through prompt building, the backend call and response
//! reconciliation. A request always ends with a usable itinerary: either the
//! model's plan (`Generated`) or a synthesized one (`FallbackUsed`) tagged with
//! the failure that forced it.
//!
//! Stages per request:
//! `Building -> Calling -> Validating -> Generated` or
//! `Building -> Calling -> Reconciling -> FallbackUsed`. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::models::itinerary::Itinerary;
use crate::models::trip::{TripRequest, DEFAULT_MAX_TRIP_DAYS};
use crate::services::distance_service::DistanceService;
use crate::services::fallback_synthesizer::FallbackSynthesizer;
use crate::services::generation_client::{GenerationBackend, GenerationError, DEFAULT_TIMEOUT_SECS};
use crate::services::prompt_builder::build_prompt;
use crate::services::response_reconciler::{ReconcileError, ResponseReconciler};

/// Why a request ended up with a synthesized itinerary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FallbackReason {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl FallbackReason {
    /// Stable identifier for logs and API consumers
    pub fn kind(&self) -> &'static str {
        match self {
            FallbackReason::Generation(GenerationError::BackendUnreachable(_)) => "backend_unreachable",
            FallbackReason::Generation(GenerationError::BackendTimeout(_)) => "backend_timeout",
            FallbackReason::Generation(GenerationError::BackendHttpError(_)) => "backend_http_error",
            FallbackReason::Generation(GenerationError::EmptyResponse) => "empty_response",
            FallbackReason::Generation(GenerationError::InvalidEnvelope(_)) => "invalid_envelope",
            FallbackReason::Reconcile(ReconcileError::MalformedOutput(_)) => "malformed_output",
            FallbackReason::Reconcile(ReconcileError::SchemaViolation(_)) => "schema_violation",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(Itinerary),
    FallbackUsed {
        itinerary: Itinerary,
        reason: FallbackReason,
    },
}

impl GenerationOutcome {
    pub fn itinerary(&self) -> &Itinerary {
        match self {
            GenerationOutcome::Generated(itinerary) => itinerary,
            GenerationOutcome::FallbackUsed { itinerary, .. } => itinerary,
        }
    }

    pub fn into_itinerary(self) -> Itinerary {
        match self {
            GenerationOutcome::Generated(itinerary) => itinerary,
            GenerationOutcome::FallbackUsed { itinerary, .. } => itinerary,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            GenerationOutcome::Generated(_) => None,
            GenerationOutcome::FallbackUsed { reason, .. } => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ItineraryGenerationConfig {
    /// Hard deadline for the backend call, whatever the backend implementation
    pub timeout: Duration,
    pub max_days: u32,
}

impl Default for ItineraryGenerationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_days: DEFAULT_MAX_TRIP_DAYS,
        }
    }
}

/// Shared between workers; holds no per-request state.
pub struct ItineraryGenerator {
    backend: Arc<dyn GenerationBackend>,
    reconciler: ResponseReconciler,
    synthesizer: FallbackSynthesizer,
    config: ItineraryGenerationConfig,
}

impl ItineraryGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_config(backend, ItineraryGenerationConfig::default(), DistanceService::default())
    }

    pub fn with_config(
        backend: Arc<dyn GenerationBackend>,
        config: ItineraryGenerationConfig,
        distance_service: DistanceService,
    ) -> Self {
        Self {
            backend,
            reconciler: ResponseReconciler::new(distance_service.clone()),
            synthesizer: FallbackSynthesizer::new(distance_service),
            config,
        }
    }

    pub fn config(&self) -> &ItineraryGenerationConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    /// Generate an itinerary. Never fails for a valid request.
    pub async fn generate(&self, request: &TripRequest) -> GenerationOutcome {
        debug!(
            "Building prompt for {} day trip from {}",
            request.day_count(),
            request.home().address
        );
        let prompt = build_prompt(request);

        debug!("Calling generation backend (timeout {:?})", self.config.timeout);
        let raw = match tokio::time::timeout(self.config.timeout, self.backend.generate(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => return self.fall_back(request, err.into()),
            Err(_) => {
                return self.fall_back(request, GenerationError::BackendTimeout(self.config.timeout).into())
            }
        };

        debug!("Validating {} bytes of generation output", raw.len());
        match self.reconciler.reconcile(&raw, request) {
            Ok(itinerary) => {
                info!(
                    "Itinerary generated: {} days for {}",
                    itinerary.days.len(),
                    request.home().address
                );
                GenerationOutcome::Generated(itinerary)
            }
            Err(err) => self.fall_back(request, err.into()),
        }
    }

    fn fall_back(&self, request: &TripRequest, reason: FallbackReason) -> GenerationOutcome {
        warn!("Falling back to synthesized itinerary ({}): {}", reason.kind(), reason);

        let itinerary = self.synthesizer.synthesize(request, request.fingerprint());
        info!(
            "Itinerary synthesized: {} days for {}",
            itinerary.days.len(),
            request.home().address
        );

        GenerationOutcome::FallbackUsed { itinerary, reason }
    }
}
