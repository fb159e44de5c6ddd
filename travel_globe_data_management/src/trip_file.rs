use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::DataManagerError;

pub async fn read_json(path: &Path) -> Result<Value, DataManagerError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataManagerError::Io { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Reads a persisted trips file. The elements are not validated.
pub async fn read_trip_array(path: &Path) -> Result<Vec<Value>, DataManagerError> {
    match read_json(path).await? {
        Value::Array(items) => Ok(items),
        _ => Err(DataManagerError::NotAnArray),
    }
}

/// Pretty printed UTF-8 JSON array.
pub async fn write_trips<T: Serialize>(path: &Path, trips: &[T]) -> Result<(), DataManagerError> {
    let json = serde_json::to_string_pretty(trips)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| DataManagerError::Io { path: path.to_path_buf(), source })
}
