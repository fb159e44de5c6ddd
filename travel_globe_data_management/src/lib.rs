use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod csv_util;
pub mod geocoder;
pub mod importer;
pub mod trip_file;

pub use importer::*;

pub const DEFAULT_OUTPUT_FILE: &str = "trips.json";

#[derive(Debug, Error)]
pub enum DataManagerError {
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("trips file must contain a JSON array of trip objects")]
    NotAnArray,
    #[error("http client error: {0}")]
    Http(String),
}
