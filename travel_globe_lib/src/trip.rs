use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::{is_iso_date_format, parse_calendar_date};

pub const DEFAULT_COLOR: &str = "#38bdf8";

pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
pub const LNG_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// One visited place. Field names are the persisted JSON names.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Trip {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    pub date: String,
    pub comments: String,
    pub color: String,
}

/// A sanitized trip with its 1-based position in presentation order.
/// The id is positional and not stable across collections.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderTrip {
    pub id: usize,
    #[serde(flatten)]
    pub trip: Trip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    Label,
    Lat,
    Lng,
    DateFormat,
    DateValue,
    Comments,
    Color,
}

impl Violation {
    /// Color is substituted on normalization, never grounds for rejection.
    pub fn rejects(self) -> bool {
        !matches!(self, Violation::Color)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Violation::Label => "invalid label",
            Violation::Lat => "invalid lat",
            Violation::Lng => "invalid lng",
            Violation::DateFormat => "invalid date format (YYYY-MM-DD)",
            Violation::DateValue => "invalid date value",
            Violation::Comments => "invalid comments",
            Violation::Color => "invalid color",
        };
        f.write_str(text)
    }
}

impl Trip {
    pub fn new(label: String, lat: f64, lng: f64, date: String, comments: String, color: String) -> Self {
        Self {
            label,
            lat,
            lng,
            date,
            comments,
            color,
        }
    }

    /// Every field constraint this trip breaks, in field order.
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if !is_valid_label(&self.label) {
            violations.push(Violation::Label);
        }
        if !is_valid_lat(self.lat) {
            violations.push(Violation::Lat);
        }
        if !is_valid_lng(self.lng) {
            violations.push(Violation::Lng);
        }
        violations.extend(date_violations(&self.date));
        if !is_hex_color(&self.color) {
            violations.push(Violation::Color);
        }
        violations
    }

    pub fn is_valid(&self) -> bool {
        self.violations().into_iter().all(|violation| !violation.rejects())
    }
}

pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
}

pub fn is_valid_lat(lat: f64) -> bool {
    lat.is_finite() && LAT_RANGE.contains(&lat)
}

pub fn is_valid_lng(lng: f64) -> bool {
    lng.is_finite() && LNG_RANGE.contains(&lng)
}

pub(crate) fn date_violations(date: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !is_iso_date_format(date) {
        violations.push(Violation::DateFormat);
    }
    if parse_calendar_date(date).is_none() {
        violations.push(Violation::DateValue);
    }
    violations
}

/// `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
pub fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn normalize_color(color: Option<&str>) -> String {
    match color {
        Some(color) if is_hex_color(color) => color.to_string(),
        _ => DEFAULT_COLOR.to_string(),
    }
}

/// Built-in collection shown when no shared trips are available.
pub fn default_trips() -> Vec<Trip> {
    vec![
        Trip::new(
            "Kyoto, Japan".into(),
            35.0116,
            135.7681,
            "2025-03-17".into(),
            "Cherry blossoms at Maruyama Park; matcha overload.".into(),
            "#0EA5E9".into(),
        ),
        Trip::new(
            "Seoul, South Korea".into(),
            37.5665,
            126.978,
            "2024-12-02".into(),
            "Bibimbap + late night shopping in Myeongdong.".into(),
            "#22C55E".into(),
        ),
        Trip::new(
            "Barcelona, Spain".into(),
            41.3874,
            2.1686,
            "2023-09-05".into(),
            "Gaudí tour: Sagrada Família and Park Güell.".into(),
            "#F59E0B".into(),
        ),
        Trip::new(
            "San Francisco, USA".into(),
            37.7749,
            -122.4194,
            "2022-06-11".into(),
            "Foggy Golden Gate, perfect clam chowder at Fisherman's Wharf.".into(),
            "#EF4444".into(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kyoto() -> Trip {
        default_trips().remove(0)
    }

    #[test]
    fn default_trips_are_valid() {
        for trip in default_trips() {
            assert!(trip.violations().is_empty(), "{trip:?}");
        }
    }

    #[test]
    fn each_field_can_reject() {
        let mut trip = kyoto();
        trip.label = String::new();
        assert_eq!(trip.violations(), vec![Violation::Label]);
        assert!(!trip.is_valid());

        let mut trip = kyoto();
        trip.lat = 90.5;
        assert_eq!(trip.violations(), vec![Violation::Lat]);

        let mut trip = kyoto();
        trip.lng = f64::NAN;
        assert_eq!(trip.violations(), vec![Violation::Lng]);

        let mut trip = kyoto();
        trip.date = "2023-02-30".into();
        assert_eq!(trip.violations(), vec![Violation::DateValue]);

        let mut trip = kyoto();
        trip.date = "2023/02/03".into();
        assert_eq!(trip.violations(), vec![Violation::DateFormat]);
        assert!(!trip.is_valid());

        let mut trip = kyoto();
        trip.date = "someday".into();
        assert_eq!(trip.violations(), vec![Violation::DateFormat, Violation::DateValue]);
    }

    #[test]
    fn color_never_rejects() {
        let mut trip = kyoto();
        trip.color = "not-a-color".into();
        assert_eq!(trip.violations(), vec![Violation::Color]);
        assert!(trip.is_valid());
    }

    #[test]
    fn coordinate_bounds_are_inclusive() {
        assert!(is_valid_lat(90.0) && is_valid_lat(-90.0));
        assert!(is_valid_lng(180.0) && is_valid_lng(-180.0));
        assert!(!is_valid_lat(95.0));
        assert!(!is_valid_lng(f64::INFINITY));
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#ABC"));
        assert!(is_hex_color("#38bdf8"));
        assert!(is_hex_color("#38bdf8cc"));
        assert!(!is_hex_color("38bdf8"));
        assert!(!is_hex_color("#38bdf"));
        assert!(!is_hex_color("#GGG"));
        assert!(!is_hex_color(""));

        assert_eq!(normalize_color(Some("#ABC")), "#ABC");
        assert_eq!(normalize_color(Some("not-a-color")), DEFAULT_COLOR);
        assert_eq!(normalize_color(None), DEFAULT_COLOR);
    }

    #[test]
    fn render_trip_flattens() {
        let trip = RenderTrip { id: 1, trip: kyoto() };
        let value = serde_json::to_value(&trip).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["label"], "Kyoto, Japan");
        assert_eq!(value["color"], "#0EA5E9");
    }
}
