use url::form_urlencoded;

use crate::{
    sanitize::{sanitize_items, sanitize_trips},
    token::decode,
    trip::{RenderTrip, Trip},
};

pub const TRIPS_PARAM: &str = "trips";

pub fn share_query(token: &str) -> String {
    format!("?{TRIPS_PARAM}={token}")
}

/// Pulls the `trips` value out of a query string or full URL.
pub fn token_from_query(query: &str) -> Option<String> {
    let query = query.split('#').next().unwrap_or_default();
    let query = match query.split_once('?') {
        Some((_, query)) => query,
        None => query,
    };

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TRIPS_PARAM)
        // Form decoding reads '+' as a space, but '+' is part of the token alphabet.
        .map(|(_, value)| value.replace(' ', "+"))
}

/// Trips to show for a page opened with `query`. Anything short of a token
/// that decodes to at least one usable trip keeps the fallback.
pub fn trips_from_query(query: &str, fallback: &[Trip]) -> Vec<RenderTrip> {
    if let Some(token) = token_from_query(query) {
        match decode(&token) {
            Ok(items) => {
                let trips = sanitize_items(&items);
                if !trips.is_empty() {
                    return trips;
                }
                tracing::warn!("Shared trips contained no usable records, keeping fallback");
            }
            Err(err) => tracing::warn!("Ignoring shared trips: {err}"),
        }
    }

    sanitize_trips(fallback)
}
