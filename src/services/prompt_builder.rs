use crate::models::trip::TripRequest;

const MIN_PLACES_PER_DAY: u32 = 4;
const MAX_PLACES_PER_DAY: u32 = 6;

/// Prompt sent to the generation backend: the request in prose plus the
/// output schema the backend must follow.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptText {
    pub instruction: String,
    pub schema: String,
}

impl PromptText {
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.instruction, self.schema)
    }
}

/// Render a request into a prompt. Pure; the same request always gives the same text.
pub fn build_prompt(request: &TripRequest) -> PromptText {
    let days = request.day_count();
    let modes = request
        .transport_modes()
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let home = request.home();

    // The address is user text; JSON-quote it so it cannot close the framing
    let quoted_address = serde_json::to_string(&home.address).unwrap_or_else(|_| "\"\"".to_string());

    let instruction = format!(
        "Generate a detailed {days}-day travel itinerary for exploring the area around the \
         accommodation at {address} (coordinates: lat {lat}, lng {lng}).\n\
         Number of days: {days}\n\
         Transportation modes: {modes}\n\
         For each day, include:\n\
         - A list of {min}-{max} places to visit, in visiting order\n\
         - Estimated duration at each place\n\
         - Brief descriptions\n\
         - Start and end times\n\
         - Total distance and duration\n\
         Do not include the accommodation itself; it is added automatically.",
        days = days,
        address = quoted_address,
        lat = home.coordinates.lat,
        lng = home.coordinates.lng,
        modes = modes,
        min = MIN_PLACES_PER_DAY,
        max = MAX_PLACES_PER_DAY,
    );

    let schema = format!(
        "Respond with a single JSON object and nothing else, using exactly this structure:\n\
         {{\n  \"itineraries\": [\n    {{\n      \"day\": 1,\n      \"totalDistance\": \"X km\",\n      \
         \"totalDuration\": \"X hours\",\n      \"startTime\": \"9:00 AM\",\n      \"endTime\": \"5:00 PM\",\n      \
         \"places\": [\n        {{\n          \"name\": \"Place Name\",\n          \"description\": \"Brief description\",\n          \
         \"duration\": \"X hours\",\n          \"address\": \"Address\",\n          \"type\": \"attraction\",\n          \
         \"coordinates\": {{\"lat\": 0.0, \"lng\": 0.0}}\n        }}\n      ]\n    }}\n  ]\n}}\n\
         Rules:\n\
         - \"itineraries\" must contain exactly {days} entries, one per day, in order.\n\
         - \"type\" must be one of: accommodation, food, attraction, outdoor.\n\
         - \"coordinates\" must be numbers, never strings.\n\
         - \"duration\" is a string such as \"45 min\" or \"2 hours\".",
        days = days,
    );

    PromptText { instruction, schema }
}
