//! Place name to coordinate lookup against a Nominatim-compatible search API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use travel_globe_lib::{
    sanitize::parse_coordinate,
    trip::{is_valid_lat, is_valid_lng},
};
use url::Url;

use crate::{DataManagerError, config::ImportConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Rejects anything outside ±90 latitude or ±180 longitude.
    pub fn checked(self) -> Result<Self, GeocodeError> {
        if !is_valid_lat(self.lat) {
            return Err(GeocodeError::OutOfRange { axis: "Latitude", value: self.lat });
        }
        if !is_valid_lng(self.lng) {
            return Err(GeocodeError::OutOfRange { axis: "Longitude", value: self.lng });
        }
        Ok(self)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("network error: {0}")]
    Network(String),
    #[error("geocode request failed with status {0}")]
    Status(u16),
    #[error("no results returned")]
    NoResults,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{axis} {value} out of bounds")]
    OutOfRange { axis: &'static str, value: f64 },
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates of the first match for `place`.
    async fn lookup(&self, place: &str) -> Result<Coordinates, GeocodeError>;
}

pub struct NominatimGeocoder {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl NominatimGeocoder {
    pub fn new(config: &ImportConfig) -> Result<Self, DataManagerError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|err| DataManagerError::Config(format!("invalid geocoder endpoint {:?}: {err}", config.endpoint)))?;

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|err| DataManagerError::Http(err.to_string()))?;

        Ok(Self { http_client, endpoint })
    }

    pub fn search_url(&self, place: &str) -> Url {
        let kept: Vec<(String, String)> = self
            .endpoint
            .query_pairs()
            .filter(|(key, _)| !matches!(key.as_ref(), "format" | "limit" | "q"))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("q", place);
        url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, place: &str) -> Result<Coordinates, GeocodeError> {
        let url = self.search_url(place);
        tracing::debug!(place, url = %url, "Geocoding");

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| GeocodeError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| GeocodeError::Malformed(err.to_string()))?;

        first_result(&body)
    }
}

/// Reads the first search hit. Coordinates may be numbers or numeric strings.
pub fn first_result(body: &Value) -> Result<Coordinates, GeocodeError> {
    let results = body
        .as_array()
        .ok_or_else(|| GeocodeError::Malformed("expected an array of results".to_string()))?;
    let first = results.first().ok_or(GeocodeError::NoResults)?;

    let lat = first.get("lat").and_then(parse_coordinate);
    let lng = first
        .get("lon")
        .or_else(|| first.get("lng"))
        .and_then(parse_coordinate);

    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Coordinates { lat, lng }),
        _ => Err(GeocodeError::Malformed("result has no numeric lat/lon".to_string())),
    }
}
