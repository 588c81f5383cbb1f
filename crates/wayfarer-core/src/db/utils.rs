//! Shared query helpers: LIKE escaping, distance math, sort validation, and
//! column conversions.

use jiff::civil::Date;
use jiff::Timestamp;
use rusqlite::types::Type;
use rusqlite::Row;

use crate::error::{Result, StoreError};
use crate::models::SortSpec;

/// Mean Earth radius in meters, used by the haversine distance calculation.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Escapes LIKE wildcards in user-supplied search text.
///
/// The result is meant to be wrapped in `%...%` and used with `ESCAPE '\'`
/// so that `%`, `_`, and `\` in the input match literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Great-circle distance in meters between two coordinates.
pub(crate) fn haversine_distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Builds an ORDER BY clause from an optional caller-supplied sort.
///
/// The sort field is resolved through `whitelist` (logical name, column)
/// pairs; anything else is rejected so caller input never reaches the SQL
/// text directly. `default` is the full ordering used when no sort is given.
/// Explicit sorts get an `id ASC` tiebreaker for deterministic pagination.
pub(crate) fn order_clause(
    sort: Option<&SortSpec>,
    whitelist: &[(&str, &str)],
    default: &str,
) -> Result<String> {
    match sort {
        None => Ok(format!("ORDER BY {default}")),
        Some(spec) => {
            let column = whitelist
                .iter()
                .find(|(field, _)| *field == spec.field)
                .map(|(_, column)| *column)
                .ok_or_else(|| StoreError::InvalidInput {
                    field: "sort".to_string(),
                    reason: format!(
                        "Cannot sort by '{}'; supported fields: {}",
                        spec.field,
                        whitelist
                            .iter()
                            .map(|(field, _)| *field)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                })?;
            Ok(format!(
                "ORDER BY {column} {}, id ASC",
                spec.direction.as_sql()
            ))
        }
    }
}

/// Reads an ISO-8601 TEXT column as a [`Timestamp`].
pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a nullable ISO-8601 TEXT column as an optional [`Timestamp`].
pub(crate) fn optional_timestamp_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<Timestamp>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => text
            .parse::<Timestamp>()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

/// Reads an ISO-8601 TEXT column as a civil [`Date`].
pub(crate) fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Date> {
    row.get::<_, String>(idx)?
        .parse::<Date>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads an INTEGER rowid column as a `u64` identifier.
pub(crate) fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}
