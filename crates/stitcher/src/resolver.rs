//! Picks one catalog timestamp for a user's time token.

use stitch_common::time::{parse_datetime, timestamp_to_datetime};
use stitch_common::{StitchError, StitchResult, Timestamp};

use crate::metadata::TimestampCatalog;

/// Resolve `token` against `catalog`.
///
/// - `latest` (any case) → the newest entry
/// - an integer present in the catalog → itself
/// - a date/time → the entry closest to it; on a tie the earlier catalog
///   position wins, which for a newest-first catalog is the newer snapshot
pub fn resolve_timestamp(token: &str, catalog: &TimestampCatalog) -> StitchResult<Timestamp> {
    let token = token.trim();

    if token.eq_ignore_ascii_case("latest") {
        return Ok(catalog.latest());
    }

    if let Ok(ts) = token.parse::<Timestamp>() {
        if catalog.contains(ts) {
            return Ok(ts);
        }
    }

    let target = parse_datetime(token).ok_or_else(|| {
        StitchError::InvalidTimestampRequest(format!("cannot interpret '{}' as a time", token))
    })?;

    catalog
        .as_slice()
        .iter()
        .filter_map(|&ts| {
            let at = timestamp_to_datetime(ts)?;
            let distance = at.signed_duration_since(target).num_seconds().unsigned_abs();
            Some((ts, distance))
        })
        // min_by_key keeps the first of equal minima
        .min_by_key(|&(_, distance)| distance)
        .map(|(ts, _)| ts)
        .ok_or_else(|| {
            StitchError::InvalidTimestampRequest(format!(
                "no catalog entry can be compared with '{}'",
                token
            ))
        })
}
