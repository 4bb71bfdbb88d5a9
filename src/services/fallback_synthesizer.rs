use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::itinerary::{DayPlan, Itinerary, Stop, StopCategory};
use crate::models::location::{Coordinates, Location};
use crate::models::trip::TripRequest;
use crate::services::distance_service::DistanceService;

/// Largest offset, per axis, between a synthesized stop and the home location
pub const MAX_JITTER_DEGREES: f64 = 0.01;

struct Archetype {
    name: &'static str,
    description: &'static str,
    street: &'static str,
    minutes: u32,
    category: StopCategory,
}

const CATALOGUE: [Archetype; 4] = [
    Archetype {
        name: "Local Cafe",
        description: "Start your day with a traditional breakfast",
        street: "123 Sample Street",
        minutes: 45,
        category: StopCategory::Food,
    },
    Archetype {
        name: "Historic Museum",
        description: "Explore local history and culture",
        street: "456 History Lane",
        minutes: 120,
        category: StopCategory::Attraction,
    },
    Archetype {
        name: "City Park",
        description: "Relax and enjoy nature in the heart of the city",
        street: "789 Park Avenue",
        minutes: 60,
        category: StopCategory::Outdoor,
    },
    Archetype {
        name: "Local Restaurant",
        description: "Lunch break with local specialties",
        street: "321 Food Street",
        minutes: 60,
        category: StopCategory::Food,
    },
];

/// Builds placeholder itineraries when the model's output can't be used.
/// The same seed always produces the same itinerary.
#[derive(Debug, Clone, Default)]
pub struct FallbackSynthesizer {
    distance_service: DistanceService,
}

impl FallbackSynthesizer {
    pub fn new(distance_service: DistanceService) -> Self {
        Self { distance_service }
    }

    pub fn synthesize(&self, request: &TripRequest, seed: u64) -> Itinerary {
        let mut rng = StdRng::seed_from_u64(seed);
        let home = request.home();

        let days = (1..=request.day_count())
            .map(|day_index| {
                let mut stops = vec![Stop::anchor(home)];
                stops.extend(CATALOGUE.iter().map(|archetype| Stop {
                    name: archetype.name.to_string(),
                    description: archetype.description.to_string(),
                    duration_minutes: archetype.minutes,
                    address: format!("{}, {}", archetype.street, home.address),
                    category: archetype.category,
                    coordinates: jitter(&mut rng, home),
                }));
                stops.push(Stop::anchor(home));

                let summary = self.distance_service.estimate(&stops, request.primary_mode());
                DayPlan {
                    day_index,
                    stops,
                    summary,
                }
            })
            .collect();

        Itinerary { days }
    }
}

fn jitter(rng: &mut StdRng, home: &Location) -> Coordinates {
    let lat = home.coordinates.lat + rng.gen_range(-MAX_JITTER_DEGREES..=MAX_JITTER_DEGREES);
    let lng = home.coordinates.lng + rng.gen_range(-MAX_JITTER_DEGREES..=MAX_JITTER_DEGREES);
    Coordinates::new(lat.clamp(-90.0, 90.0), lng.clamp(-180.0, 180.0))
}
