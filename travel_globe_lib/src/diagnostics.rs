//! Non-fatal self-check of a trip collection.
//!
//! The same predicates that decide rejection are used here to narrate what
//! is wrong. Nothing in this module logs or fails, callers decide what to do
//! with the report.

use std::fmt;

use serde_json::Value;

use crate::trip::{Trip, Violation, date_violations, is_hex_color, is_valid_label, is_valid_lat, is_valid_lng};

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsReport {
    pub checked: usize,
    pub violations: Vec<String>,
}

impl DiagnosticsReport {
    pub fn is_clear(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clear() {
            return write!(f, "Sanity tests passed ({} trips)", self.checked);
        }
        write!(f, "Sanity test failures:")?;
        for violation in &self.violations {
            write!(f, "\n - {violation}")?;
        }
        Ok(())
    }
}

pub fn check<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> Vec<String> {
    trips
        .into_iter()
        .enumerate()
        .flat_map(|(index, trip)| {
            trip.violations()
                .into_iter()
                .map(move |violation| describe(index, violation))
        })
        .collect()
}

pub fn report<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> DiagnosticsReport {
    let trips: Vec<&Trip> = trips.into_iter().collect();
    DiagnosticsReport {
        checked: trips.len(),
        violations: check(trips),
    }
}

/// Checks untyped JSON, so wrong field types are reported too.
pub fn check_values(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec!["Trips is not an array".to_string()];
    };

    let mut violations = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(record) = item.as_object() else {
            violations.push(format!("Trip #{index} is not an object"));
            continue;
        };

        let mut found = Vec::new();
        if !record.get("label").and_then(Value::as_str).is_some_and(is_valid_label) {
            found.push(Violation::Label);
        }
        if !record.get("lat").and_then(Value::as_f64).is_some_and(is_valid_lat) {
            found.push(Violation::Lat);
        }
        if !record.get("lng").and_then(Value::as_f64).is_some_and(is_valid_lng) {
            found.push(Violation::Lng);
        }
        match record.get("date").and_then(Value::as_str) {
            Some(date) => found.extend(date_violations(date)),
            None => found.extend([Violation::DateFormat, Violation::DateValue]),
        }
        if !record.get("comments").is_some_and(Value::is_string) {
            found.push(Violation::Comments);
        }
        // Color is optional, only a present value has to be well formed.
        if record
            .get("color")
            .is_some_and(|color| !color.as_str().is_some_and(is_hex_color))
        {
            found.push(Violation::Color);
        }

        violations.extend(found.into_iter().map(|violation| describe(index, violation)));
    }
    violations
}

pub fn report_values(value: &Value) -> DiagnosticsReport {
    DiagnosticsReport {
        checked: value.as_array().map_or(0, Vec::len),
        violations: check_values(value),
    }
}

fn describe(index: usize, violation: Violation) -> String {
    format!("Trip #{index} {violation}")
}
