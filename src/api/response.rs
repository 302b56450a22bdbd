use crate::error::{ApiError, ApiResult};
use crate::models::{CatalogRecord, LocalEntry, MediaKind};
use serde_json::Value;
use tracing::warn;

/// Turns a list response into entries. The backend answers either
/// `{ "items": [...] }` or a bare array; any other shape yields an empty list
/// so the view stays renderable, and rows that fail to decode are skipped.
pub fn parse_collection(value: Value) -> Vec<LocalEntry> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(rows)) => rows,
            _ => {
                warn!("List response has no items array, treating as empty");
                return Vec::new();
            }
        },
        other => {
            warn!("List response is not a collection ({}), treating as empty", kind_of(&other));
            return Vec::new();
        }
    };

    let total = rows.len();
    let entries: Vec<LocalEntry> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<LocalEntry>(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed list row: {}", e);
                None
            }
        })
        .collect();

    if entries.len() != total {
        warn!("Kept {} of {} list rows", entries.len(), total);
    }
    entries
}

/// Decodes the by-catalog-id response, which is either a flat catalog record
/// or an envelope `{ "tmdb": {...}, "local": {...} | null }`.
pub fn parse_catalog_record(kind: MediaKind, value: Value) -> ApiResult<CatalogRecord> {
    let Value::Object(mut map) = value else {
        return Err(ApiError::UnexpectedResponse(format!(
            "expected a catalog object, got {}",
            kind_of(&value)
        )));
    };

    let record = match map.remove("tmdb") {
        Some(tmdb @ Value::Object(_)) => {
            let local = match map.remove("local") {
                None | Some(Value::Null) => None,
                Some(local) => Some(serde_json::from_value::<LocalEntry>(local)?),
            };
            let mut record: CatalogRecord = serde_json::from_value(tmdb)?;
            record.local = local;
            record
        }
        Some(other) => {
            // A flat record may carry a `tmdb` artwork field of another shape.
            map.insert("tmdb".to_string(), other);
            serde_json::from_value(Value::Object(map))?
        }
        None => serde_json::from_value(Value::Object(map))?,
    };

    Ok(record.normalized(kind))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
