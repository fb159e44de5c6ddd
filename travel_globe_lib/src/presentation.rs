use serde::Serialize;

use crate::{date::year_of, trip::RenderTrip};

pub const POINT_ALTITUDE: f64 = 0.02;
pub const POINT_SIZE: f64 = 0.7;
pub const LABEL_ALTITUDE: f64 = 0.03;
pub const LABEL_SIZE: f64 = 1.1;
pub const LABEL_FALLBACK_COLOR: &str = "#111827";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDatum {
    #[serde(flatten)]
    pub trip: RenderTrip,
    pub altitude: f64,
    pub size: f64,
    pub point_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelDatum {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub text: String,
    pub color: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    pub destinations: usize,
    pub latest: Option<RenderTrip>,
    pub earliest_year: Option<i32>,
}

fn year_text(date: &str) -> String {
    year_of(date).map_or_else(|| "?".to_string(), |year| year.to_string())
}

pub fn points(trips: &[RenderTrip]) -> Vec<PointDatum> {
    trips
        .iter()
        .map(|trip| PointDatum {
            point_label: format!("{} — {}", trip.trip.label, year_text(&trip.trip.date)),
            trip: trip.clone(),
            altitude: POINT_ALTITUDE,
            size: POINT_SIZE,
        })
        .collect()
}

pub fn labels(trips: &[RenderTrip]) -> Vec<LabelDatum> {
    trips
        .iter()
        .map(|RenderTrip { trip, .. }| LabelDatum {
            lat: trip.lat,
            lng: trip.lng,
            altitude: LABEL_ALTITUDE,
            text: format!("{} • {}", year_text(&trip.date), trip.label),
            color: if trip.color.is_empty() {
                LABEL_FALLBACK_COLOR.to_string()
            } else {
                trip.color.clone()
            },
            size: LABEL_SIZE,
        })
        .collect()
}

/// Case-insensitive match on label or comments. A blank query keeps everything.
pub fn filter_trips<'a>(trips: &'a [RenderTrip], query: &str) -> Vec<&'a RenderTrip> {
    let query = query.trim().to_lowercase();
    trips
        .iter()
        .filter(|RenderTrip { trip, .. }| {
            query.is_empty()
                || trip.label.to_lowercase().contains(&query)
                || trip.comments.to_lowercase().contains(&query)
        })
        .collect()
}

/// Resolves a "select trip" signal from the renderer.
pub fn select(trips: &[RenderTrip], id: usize) -> Option<&RenderTrip> {
    trips.iter().find(|trip| trip.id == id)
}

/// Expects presentation order, newest first.
pub fn summarize(trips: &[RenderTrip]) -> TripSummary {
    TripSummary {
        destinations: trips.len(),
        latest: trips.first().cloned(),
        earliest_year: trips.last().and_then(|trip| year_of(&trip.trip.date)),
    }
}
