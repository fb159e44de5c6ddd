use std::{collections::HashMap, path::Path, time::Duration};

use thiserror::Error;
use tokio::time::Instant;
use travel_globe_lib::{
    date::normalize_date,
    trip::{Trip, is_hex_color, normalize_color},
};

use crate::{
    DataManagerError,
    config::ImportConfig,
    csv_util::{CsvRow, read_rows},
    geocoder::{Coordinates, GeocodeError, Geocoder, NominatimGeocoder},
    trip_file::write_trips,
};

/// Aborts the whole run, nothing is written.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing date on line {line}")]
    MissingDate { line: u64 },
    #[error("invalid date {value:?} on line {line}")]
    InvalidDate { line: u64, value: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("missing location")]
    MissingLocation,
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub place: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportReport {
    /// In input row order.
    pub trips: Vec<Trip>,
    pub skipped: Vec<SkippedRow>,
}

/// Lookup results for a single import run, keyed by the exact place string.
/// Failures are kept as well, so no place is looked up twice.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: HashMap<String, Result<Coordinates, GeocodeError>>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, place: &str) -> Option<&Result<Coordinates, GeocodeError>> {
        self.entries.get(place)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Spaces out external lookups by at least `min_interval`.
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last_time) = self.last_request {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        self.last_request = Some(Instant::now());
    }
}

/**
 * Turns CSV rows into trips, one row at a time. Each distinct place costs at
 * most one lookup per cache, and lookups are rate limited.
 */
pub struct TripImporter<G> {
    geocoder: G,
    rate_limiter: RateLimiter,
}

impl<G: Geocoder> TripImporter<G> {
    pub fn new(geocoder: G, delay: Duration) -> Self {
        Self {
            geocoder,
            rate_limiter: RateLimiter::new(delay),
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub async fn import_rows(&mut self, rows: &[CsvRow], cache: &mut GeocodeCache) -> Result<ImportReport, ImportError> {
        // Dates are mandatory, so check them all before spending any lookups.
        let dates = rows.iter().map(row_date).collect::<Result<Vec<_>, _>>()?;

        let mut report = ImportReport::default();
        for (row, date) in rows.iter().zip(dates) {
            let Some(location) = row.location.as_deref() else {
                tracing::warn!(line = row.line, "Skipping row with missing location");
                report.skipped.push(SkippedRow {
                    line: row.line,
                    place: None,
                    reason: SkipReason::MissingLocation,
                });
                continue;
            };

            let color = normalize_color(row.color.as_deref());
            if let Some(raw) = row.color.as_deref().filter(|raw| !is_hex_color(raw)) {
                tracing::warn!(line = row.line, "Color {raw:?} invalid, using default for {location}");
            }

            let coordinates = match self.resolve(location, cache).await {
                Ok(coordinates) => coordinates,
                Err(err) => {
                    tracing::warn!(line = row.line, "Skipping {location}: {err}");
                    report.skipped.push(SkippedRow {
                        line: row.line,
                        place: Some(location.to_string()),
                        reason: err.into(),
                    });
                    continue;
                }
            };

            report.trips.push(Trip::new(
                location.to_string(),
                coordinates.lat,
                coordinates.lng,
                date,
                row.comments.clone().unwrap_or_default(),
                color,
            ));
        }

        tracing::info!(
            trips = report.trips.len(),
            skipped = report.skipped.len(),
            places = cache.len(),
            "Import finished"
        );
        Ok(report)
    }

    async fn resolve(&mut self, place: &str, cache: &mut GeocodeCache) -> Result<Coordinates, GeocodeError> {
        if let Some(cached) = cache.get(place) {
            return cached.clone();
        }

        self.rate_limiter.wait().await;
        let result = self.geocoder.lookup(place).await.and_then(Coordinates::checked);
        cache.entries.insert(place.to_string(), result.clone());
        result
    }
}

fn row_date(row: &CsvRow) -> Result<String, ImportError> {
    let value = row
        .date
        .as_deref()
        .ok_or(ImportError::MissingDate { line: row.line })?;
    normalize_date(value).ok_or_else(|| ImportError::InvalidDate {
        line: row.line,
        value: value.to_string(),
    })
}

/// Geocodes `input` against the configured endpoint and writes the trips to `output`.
pub async fn import_csv_file(input: &Path, output: &Path, config: &ImportConfig) -> Result<ImportReport, DataManagerError> {
    let geocoder = NominatimGeocoder::new(config)?;
    let mut importer = TripImporter::new(geocoder, config.delay);
    import_csv_with(input, output, &mut importer).await
}

pub async fn import_csv_with<G: Geocoder>(
    input: &Path,
    output: &Path,
    importer: &mut TripImporter<G>,
) -> Result<ImportReport, DataManagerError> {
    let raw = tokio::fs::read(input)
        .await
        .map_err(|source| DataManagerError::Io { path: input.to_path_buf(), source })?;
    let rows = read_rows(raw.as_slice()).map_err(ImportError::from)?;

    let mut cache = GeocodeCache::new();
    let report = importer.import_rows(&rows, &mut cache).await?;

    write_trips(output, &report.trips).await?;
    Ok(report)
}
