//! Schedule records and the departure rows served to the dashboard.
//!
//! Field names are camelCase on the wire because the browser client reads
//! them directly. [`BusLine`] is the raw record as stored in the schedule
//! source; [`DepartureResult`] is the display row produced by the
//! aggregator once per request or push tick.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single bus line as stored in the schedule source.
///
/// The record is deliberately unvalidated: `first_departure_time` stays a
/// string and `frequency_minutes` is signed so that bad values survive
/// deserialization and are reported as configuration errors by the
/// schedule loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BusLine {
    /// Public line number (e.g. `"12"` or `"7A"`).
    pub bus_number: String,
    /// Name of the first stop.
    pub start_point: String,
    /// Name of the last stop.
    pub end_point: String,
    /// Daily departure anchor in `HH:MM` form.
    pub first_departure_time: String,
    /// Minutes between consecutive departures within a day.
    #[ts(type = "number")]
    pub frequency_minutes: i64,
}

/// Display-formatted next departure of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FormattedDeparture {
    /// Calendar date of the departure, `YYYY-MM-DD`.
    pub date: String,
    /// Time of day of the departure, `HH:MM`.
    pub time: String,
    /// Time left until the departure, `HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub remaining: Option<String>,
}

/// One row of the departure board: the line plus its next departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DepartureResult {
    /// The schedule record, passed through unchanged.
    #[serde(flatten)]
    pub line: BusLine,
    /// The next departure of this line, formatted for display.
    pub next_departure: FormattedDeparture,
}
