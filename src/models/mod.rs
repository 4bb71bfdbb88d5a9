pub mod itinerary;
pub mod location;
pub mod trip;
