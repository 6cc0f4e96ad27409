use chrono::NaiveDate;

use super::model::{GreenhouseTable, Reading};

// ---------------------------------------------------------------------------
// Day selection
// ---------------------------------------------------------------------------

/// Return the readings of one greenhouse on one calendar date, ordered by
/// timestamp.
///
/// * `location` is the raw identifier (map display names through
///   [`LocationMap::raw_for`](super::location::LocationMap::raw_for) first).
/// * Dates compare on the timestamp's own calendar date, no time-zone shift.
/// * An empty result is a normal outcome, not an error.
pub fn select_day(table: &GreenhouseTable, date: NaiveDate, location: &str) -> Vec<Reading> {
    let mut day: Vec<Reading> = table
        .readings
        .iter()
        .filter(|r| r.date() == date && r.location == location)
        .cloned()
        .collect();

    // Stable, so readings sharing a timestamp keep file order.
    day.sort_by_key(|r| r.timestamp);
    day
}
