//! Defensive normalization of externally supplied trip data.
//!
//! Input is arbitrary JSON. Output is ordered by date (most recent first),
//! every record has numeric coordinates and a hex color, and ids are
//! assigned 1.. in final order.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{
    date::parse_calendar_date,
    trip::{RenderTrip, Trip, normalize_color},
};

/// Reads a coordinate from a JSON number or numeric string.
/// Anything else, including non-finite results, is `None`.
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Non-array input is treated as an empty collection.
pub fn sanitize(input: &Value) -> Vec<RenderTrip> {
    let Some(items) = input.as_array() else {
        tracing::warn!("Trip data is not an array, treating it as empty");
        return Vec::new();
    };
    sanitize_items(items)
}

pub fn sanitize_items(items: &[Value]) -> Vec<RenderTrip> {
    let mut ordered: Vec<&Value> = items.iter().collect();
    // Stable, so equal dates keep input order. Unparsable dates go last.
    ordered.sort_by(|a, b| newest_first(date_key(a), date_key(b)));

    ordered
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| sanitize_record(position, item))
        .enumerate()
        .map(|(index, trip)| RenderTrip { id: index + 1, trip })
        .collect()
}

pub fn sanitize_trips(trips: &[Trip]) -> Vec<RenderTrip> {
    match serde_json::to_value(trips) {
        Ok(value) => sanitize(&value),
        Err(err) => {
            tracing::warn!("Failed to convert trips for sanitizing: {err}");
            Vec::new()
        }
    }
}

fn date_key(item: &Value) -> Option<NaiveDate> {
    item.get("date")
        .and_then(Value::as_str)
        .and_then(parse_calendar_date)
}

fn newest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sanitize_record(position: usize, item: &Value) -> Option<Trip> {
    let Some(record) = item.as_object() else {
        tracing::warn!(position, "Dropping trip that is not an object");
        return None;
    };

    let lat = record.get("lat").and_then(parse_coordinate);
    let lng = record.get("lng").and_then(parse_coordinate);
    let (Some(lat), Some(lng)) = (lat, lng) else {
        tracing::warn!(
            position,
            label = %text_field(record, "label"),
            "Dropping trip with non-numeric coordinates"
        );
        return None;
    };

    let raw_color = record.get("color").and_then(Value::as_str);
    let color = normalize_color(raw_color);
    if raw_color.is_some_and(|raw| raw != color) {
        tracing::debug!(position, "Replaced invalid color {:?} with {color}", raw_color);
    }

    Some(Trip::new(
        text_field(record, "label"),
        lat,
        lng,
        text_field(record, "date"),
        text_field(record, "comments"),
        color,
    ))
}

fn text_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}
