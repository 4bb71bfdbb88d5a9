//! Response Reconciler
//!
//! Turns the generation backend's free text into an [`Itinerary`] in three
//! stages, each with its own failure signal:
//!
//! 1. extraction: find the first balanced `{...}` span in the prose
//! 2. validation: check the span against the itinerary schema
//! 3. normalization: anchor every day at the home location and fill in
//!    missing summary fields
//!
//! Any stage failing yields a [`ReconcileError`]; the generator then switches to
//! fallback synthesis. No partial acceptance: one bad stop rejects the whole plan.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::itinerary::{DayPlan, DaySummary, Itinerary, Stop, StopCategory};
use crate::models::location::{Coordinates, Location};
use crate::models::trip::{TransportMode, TripRequest};
use crate::services::distance_service::DistanceService;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),
    #[error("Model output violates the itinerary schema: {0}")]
    SchemaViolation(String),
}

/// Returns the first balanced `{...}` span. Braces inside JSON string literals
/// are ignored. A `{` that never closes is skipped in favour of a later one.
///
/// Single pass: open positions sit on a stack and every `}` closes the most
/// recent one, so the earliest start that closes wins without rescanning.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let first = raw.find('{')?;
    let bytes = raw.as_bytes();

    let mut open: Vec<usize> = Vec::new();
    let mut best: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (pos, &byte) in bytes.iter().enumerate().skip(first) {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => open.push(pos),
            b'}' => {
                let Some(start) = open.pop() else { continue };
                if best.map_or(true, |(b, _)| start < b) {
                    best = Some((start, pos));
                }
                // Nothing still open can start before this span
                if open.is_empty() {
                    break;
                }
            }
            _ => {}
        }
    }

    best.map(|(start, end)| &raw[start..=end])
}

/// Longest visit a single stop may claim
pub const MAX_STOP_MINUTES: u32 = 24 * 60;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(\d+(?:\.\d+)?)\s*(?:(?:-|–|to)\s*\d+(?:\.\d+)?\s*)?(hours|hour|hrs|hr|h|minutes|minute|mins|min|m)\b",
        )
        .expect("duration pattern is valid")
    })
}

/// Minutes from strings like "45 min", "2 hours", "1.5 hours", "1 hour 30 min"
/// or "2-3 hours" (first number of a range). A bare number is read as minutes.
pub fn parse_duration_minutes(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if let Ok(minutes) = trimmed.parse::<f64>() {
        return (minutes.is_finite() && minutes >= 0.0).then(|| minutes.round() as u32);
    }

    let mut total = 0.0;
    let mut matched = false;
    for caps in duration_pattern().captures_iter(trimmed) {
        let amount: f64 = caps[1].parse().ok()?;
        let unit = caps[2].to_lowercase();
        total += if unit.starts_with('h') { amount * 60.0 } else { amount };
        matched = true;
    }

    matched.then(|| total.round() as u32)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let minutes = match &value {
        Value::Number(n) => match n.as_f64() {
            Some(minutes) if minutes.is_finite() && minutes >= 0.0 => minutes,
            _ => return Err(de::Error::custom(format!("invalid duration {}", n))),
        },
        Value::String(s) => parse_duration_minutes(s)
            .map(f64::from)
            .ok_or_else(|| {
                <D::Error as de::Error>::custom(format!("unrecognised duration \"{}\"", s))
            })?,
        other => {
            return Err(de::Error::custom(format!(
                "duration must be a string or number, got {}",
                other
            )))
        }
    };

    if minutes.round() > MAX_STOP_MINUTES as f64 {
        return Err(de::Error::custom(format!(
            "duration {} exceeds {} minutes",
            value, MAX_STOP_MINUTES
        )));
    }
    Ok(minutes.round() as u32)
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<StopCategory, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    StopCategory::parse(&raw).ok_or_else(|| de::Error::custom(format!("unknown place type \"{}\"", raw)))
}

/// Display fields are best-effort: keep strings and numbers, drop anything else.
fn display_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    #[serde(alias = "days")]
    itineraries: Vec<RawDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDay {
    #[serde(alias = "stops")]
    places: Vec<RawStop>,
    #[serde(default)]
    total_distance: Option<Value>,
    #[serde(default)]
    total_duration: Option<Value>,
    #[serde(default)]
    start_time: Option<Value>,
    #[serde(default)]
    end_time: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStop {
    name: String,
    description: String,
    #[serde(deserialize_with = "deserialize_duration")]
    duration: u32,
    address: String,
    #[serde(rename = "type", alias = "category", deserialize_with = "deserialize_category")]
    category: StopCategory,
    coordinates: Coordinates,
}

/// A validated day before anchoring; summary fields may still be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct DayDraft {
    pub stops: Vec<Stop>,
    pub total_distance: Option<String>,
    pub total_duration: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Check a parsed payload against the itinerary schema.
pub fn validate(value: Value, day_count: u32) -> Result<Vec<DayDraft>, ReconcileError> {
    let raw: RawItinerary =
        serde_json::from_value(value).map_err(|e| ReconcileError::SchemaViolation(e.to_string()))?;

    if raw.itineraries.len() != day_count as usize {
        return Err(ReconcileError::SchemaViolation(format!(
            "expected {} days, got {}",
            day_count,
            raw.itineraries.len()
        )));
    }

    raw.itineraries
        .into_iter()
        .enumerate()
        .map(|(index, day)| {
            if day.places.is_empty() {
                return Err(ReconcileError::SchemaViolation(format!(
                    "day {} has no places",
                    index + 1
                )));
            }

            let stops = day
                .places
                .into_iter()
                .map(|place| {
                    if !place.coordinates.is_valid() {
                        return Err(ReconcileError::SchemaViolation(format!(
                            "place \"{}\" on day {} has out-of-range coordinates",
                            place.name,
                            index + 1
                        )));
                    }
                    Ok(Stop {
                        name: place.name,
                        description: place.description,
                        duration_minutes: place.duration,
                        address: place.address,
                        category: place.category,
                        coordinates: place.coordinates,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(DayDraft {
                stops,
                total_distance: display_text(day.total_distance),
                total_duration: display_text(day.total_duration),
                start_time: display_text(day.start_time),
                end_time: display_text(day.end_time),
            })
        })
        .collect()
}

/// Put the home anchor at both ends. Stops already at home at either end are
/// replaced rather than duplicated, which makes this idempotent.
pub fn anchor_stops(stops: Vec<Stop>, home: &Location) -> Vec<Stop> {
    let mut inner: &[Stop] = &stops;
    while let Some((first, rest)) = inner.split_first() {
        if !first.is_at(home) {
            break;
        }
        inner = rest;
    }
    while let Some((last, rest)) = inner.split_last() {
        if !last.is_at(home) {
            break;
        }
        inner = rest;
    }

    let mut anchored = Vec::with_capacity(inner.len() + 2);
    anchored.push(Stop::anchor(home));
    anchored.extend_from_slice(inner);
    anchored.push(Stop::anchor(home));
    anchored
}

#[derive(Debug, Clone, Default)]
pub struct ResponseReconciler {
    distance_service: DistanceService,
}

impl ResponseReconciler {
    pub fn new(distance_service: DistanceService) -> Self {
        Self { distance_service }
    }

    /// Extract, validate and normalize raw backend output.
    pub fn reconcile(&self, raw: &str, request: &TripRequest) -> Result<Itinerary, ReconcileError> {
        let span = extract_json_span(raw).ok_or_else(|| {
            ReconcileError::MalformedOutput("no balanced JSON object in output".to_string())
        })?;
        debug!("Extracted {} byte JSON span from {} bytes of output", span.len(), raw.len());

        let value: Value =
            serde_json::from_str(span).map_err(|e| ReconcileError::MalformedOutput(e.to_string()))?;

        let drafts = validate(value, request.day_count())?;
        Ok(self.build(drafts, request.home(), request.primary_mode()))
    }

    /// Anchor drafts and complete their summaries.
    pub fn build(&self, drafts: Vec<DayDraft>, home: &Location, mode: TransportMode) -> Itinerary {
        let days = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                let stops = anchor_stops(draft.stops, home);
                let estimate = self.distance_service.estimate(&stops, mode);
                DayPlan {
                    day_index: index as u32 + 1,
                    summary: DaySummary {
                        total_distance: draft.total_distance.unwrap_or(estimate.total_distance),
                        total_duration: draft.total_duration.unwrap_or(estimate.total_duration),
                        start_time: draft.start_time.unwrap_or(estimate.start_time),
                        end_time: draft.end_time.unwrap_or(estimate.end_time),
                    },
                    stops,
                }
            })
            .collect();

        Itinerary { days }
    }

    /// Re-anchor an already built itinerary. Running it twice changes nothing.
    pub fn normalize(&self, itinerary: Itinerary, home: &Location, mode: TransportMode) -> Itinerary {
        let drafts = itinerary
            .days
            .into_iter()
            .map(|day| DayDraft {
                stops: day.stops,
                total_distance: Some(day.summary.total_distance).filter(|s| !s.is_empty()),
                total_duration: Some(day.summary.total_duration).filter(|s| !s.is_empty()),
                start_time: Some(day.summary.start_time).filter(|s| !s.is_empty()),
                end_time: Some(day.summary.end_time).filter(|s| !s.is_empty()),
            })
            .collect();

        self.build(drafts, home, mode)
    }
}
