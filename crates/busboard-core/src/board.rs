//! Departure board aggregation.
//!
//! [`aggregate`] turns validated lines plus the current instant into the
//! sorted, display-formatted rows shown on the dashboard. [`DepartureBoard`]
//! wires it to a [`ScheduleStore`] and a [`Clock`] and is the single entry
//! point used by the HTTP and push delivery paths.

use busboard_types::{DepartureResult, FormattedDeparture};
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use tracing::debug;

use crate::clock::Clock;
use crate::departure::{DepartureError, next_departure};
use crate::schedule::{ScheduleError, ScheduleStore, ScheduledLine};

/// Seconds in one hour.
const SECONDS_PER_HOUR: u64 = 3600;

/// Seconds in one minute.
const SECONDS_PER_MINUTE: u64 = 60;

/// Errors that can occur while computing the board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The schedule could not be loaded or validated.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A departure could not be computed.
    #[error(transparent)]
    Departure(#[from] DepartureError),
}

/// Compute, sort, and format the next departure of every line.
///
/// Rows are ordered by next departure, soonest first. Lines departing at
/// the same time keep their input order.
///
/// # Errors
///
/// Returns [`DepartureError`] if any departure falls outside the
/// representable calendar.
pub fn aggregate(
    lines: &[ScheduledLine],
    now: &DateTime<Tz>,
) -> Result<Vec<DepartureResult>, DepartureError> {
    let wall_now = now.naive_local();

    let mut rows = lines
        .iter()
        .map(|scheduled| {
            next_departure(wall_now, &scheduled.schedule).map(|departure| (departure, scheduled))
        })
        .collect::<Result<Vec<_>, DepartureError>>()?;

    // `sort_by_key` is stable, which gives the input-order tie-break.
    rows.sort_by_key(|(departure, _)| *departure);

    Ok(rows
        .into_iter()
        .map(|(departure, scheduled)| DepartureResult {
            line: scheduled.line.clone(),
            next_departure: format_departure(departure, now),
        })
        .collect())
}

/// Format a wall-clock departure relative to `now`.
pub fn format_departure(departure: NaiveDateTime, now: &DateTime<Tz>) -> FormattedDeparture {
    FormattedDeparture {
        date: departure.format("%Y-%m-%d").to_string(),
        time: departure.format("%H:%M").to_string(),
        remaining: Some(format_remaining(remaining_until(departure, now))),
    }
}

/// Real time left until a wall-clock departure.
///
/// Resolves the departure in `now`'s zone. A wall-clock time repeated by a
/// DST fall-back resolves to its first occurrence not before `now`. A
/// departure that falls into a DST gap has no instant; the wall-clock
/// difference is used instead.
fn remaining_until(departure: NaiveDateTime, now: &DateTime<Tz>) -> TimeDelta {
    match now.timezone().from_local_datetime(&departure) {
        LocalResult::Single(instant) => instant.signed_duration_since(now),
        LocalResult::Ambiguous(first, second) => {
            let instant = if first >= *now { first } else { second };
            instant.signed_duration_since(now)
        }
        LocalResult::None => departure.signed_duration_since(now.naive_local()),
    }
}

/// Format a duration as `HH:MM:SS`, truncated to whole seconds.
///
/// Negative durations clamp to zero. Hours are not wrapped at 24.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let total = u64::try_from(remaining.num_seconds()).unwrap_or(0);
    let hours = total / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total % SECONDS_PER_MINUTE;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// The live departure board: schedule source, clock, and zone.
#[derive(Debug, Clone)]
pub struct DepartureBoard {
    store: ScheduleStore,
    clock: Clock,
    zone: Tz,
}

impl DepartureBoard {
    /// Create a board.
    pub const fn new(store: ScheduleStore, clock: Clock, zone: Tz) -> Self {
        Self { store, clock, zone }
    }

    /// Load the schedule once and compute the current board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Schedule`] if the schedule cannot be loaded,
    /// or [`BoardError::Departure`] if a departure cannot be computed.
    pub async fn next_departures(&self) -> Result<Vec<DepartureResult>, BoardError> {
        let lines = self.store.load().await?;
        let now = self.clock.now_in(self.zone);
        let rows = aggregate(&lines, &now)?;
        debug!(rows = rows.len(), zone = %self.zone, "departure board computed");
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use busboard_types::BusLine;
    use chrono::Utc;

    use super::*;

    fn line(bus_number: &str, first_departure_time: &str, frequency_minutes: i64) -> BusLine {
        BusLine {
            bus_number: bus_number.to_owned(),
            start_point: format!("{bus_number} start"),
            end_point: format!("{bus_number} end"),
            first_departure_time: first_departure_time.to_owned(),
            frequency_minutes,
        }
    }

    fn scheduled(lines: Vec<BusLine>) -> Vec<ScheduledLine> {
        crate::schedule::validate_lines(lines).unwrap()
    }

    fn utc_at(hour: u32, minute: u32, second: u32) -> DateTime<Tz> {
        Utc.with_ymd_and_hms(2024, 9, 2, hour, minute, second)
            .unwrap()
            .with_timezone(&chrono_tz::UTC)
    }

    fn numbers(rows: &[DepartureResult]) -> Vec<&str> {
        rows.iter().map(|r| r.line.bus_number.as_str()).collect()
    }

    #[test]
    fn rows_are_sorted_soonest_first() {
        // Next departures at 10:20 (A), 10:05 (B), 10:12 (C).
        let lines = scheduled(vec![
            line("A", "10:20", 60),
            line("B", "09:05", 60),
            line("C", "10:12", 30),
        ]);
        let rows = aggregate(&lines, &utc_at(10, 0, 0)).unwrap();
        assert_eq!(numbers(&rows), ["B", "C", "A"]);
        assert_eq!(rows[0].next_departure.time, "10:05");
        assert_eq!(rows[1].next_departure.time, "10:12");
        assert_eq!(rows[2].next_departure.time, "10:20");
    }

    #[test]
    fn sort_order_is_independent_of_input_order() {
        let mut input = vec![
            line("T3", "12:00", 1440),
            line("T1", "10:30", 1440),
            line("T2", "11:15", 1440),
        ];
        for _ in 0..input.len() {
            input.rotate_left(1);
            let rows = aggregate(&scheduled(input.clone()), &utc_at(10, 0, 0)).unwrap();
            assert_eq!(numbers(&rows), ["T1", "T2", "T3"]);
        }
    }

    #[test]
    fn equal_departures_keep_input_order() {
        let lines = scheduled(vec![
            line("late", "11:00", 60),
            line("x", "10:30", 60),
            line("y", "10:30", 30),
            line("z", "09:30", 60),
        ]);
        let rows = aggregate(&lines, &utc_at(10, 15, 0)).unwrap();
        assert_eq!(numbers(&rows), ["x", "y", "z", "late"]);
    }

    #[test]
    fn next_day_restarts_sort_by_anchor() {
        let lines = scheduled(vec![line("night", "23:50", 30), line("day", "06:00", 10)]);
        let rows = aggregate(&lines, &utc_at(23, 55, 0)).unwrap();
        // Both restart tomorrow; the earlier anchor comes first.
        assert_eq!(numbers(&rows), ["day", "night"]);
        assert_eq!(rows[0].next_departure.date, "2024-09-03");
        assert_eq!(rows[0].next_departure.time, "06:00");
        assert_eq!(rows[1].next_departure.date, "2024-09-03");
        assert_eq!(rows[1].next_departure.time, "23:50");
    }

    #[test]
    fn rows_carry_line_fields_and_remaining_time() {
        let lines = scheduled(vec![line("5", "08:00", 60)]);
        let rows = aggregate(&lines, &utc_at(8, 30, 15)).unwrap();
        let row = &rows[0];
        assert_eq!(row.line.start_point, "5 start");
        assert_eq!(row.line.end_point, "5 end");
        assert_eq!(row.line.first_departure_time, "08:00");
        assert_eq!(row.next_departure.date, "2024-09-02");
        assert_eq!(row.next_departure.time, "09:00");
        assert_eq!(row.next_departure.remaining.as_deref(), Some("00:29:45"));
    }

    #[test]
    fn departure_now_has_zero_remaining() {
        let lines = scheduled(vec![line("5", "08:00", 60)]);
        let rows = aggregate(&lines, &utc_at(9, 0, 0)).unwrap();
        assert_eq!(rows[0].next_departure.remaining.as_deref(), Some("00:00:00"));
    }

    #[test]
    fn computes_in_configured_zone() {
        // 05:30 UTC is 08:30 in Moscow (UTC+3, no DST).
        let now = Utc
            .with_ymd_and_hms(2024, 9, 2, 5, 30, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Europe::Moscow);
        let lines = scheduled(vec![line("M", "08:00", 60)]);
        let rows = aggregate(&lines, &now).unwrap();
        assert_eq!(rows[0].next_departure.time, "09:00");
        assert_eq!(rows[0].next_departure.remaining.as_deref(), Some("00:30:00"));
    }

    #[test]
    fn remaining_spans_dst_change_in_real_time() {
        // Berlin springs forward at 02:00 on 2024-03-31; 01:30 -> 03:00
        // wall-clock is only 30 real minutes.
        let now = chrono_tz::Europe::Berlin
            .with_ymd_and_hms(2024, 3, 31, 1, 30, 0)
            .unwrap();
        let lines = scheduled(vec![line("D", "03:00", 60)]);
        let rows = aggregate(&lines, &now).unwrap();
        assert_eq!(rows[0].next_departure.time, "03:00");
        assert_eq!(rows[0].next_departure.remaining.as_deref(), Some("00:30:00"));
    }

    #[test]
    fn remaining_in_repeated_fall_back_hour_uses_upcoming_instant() {
        // Berlin falls back at 03:00 CEST on 2024-10-27; 02:00-03:00 wall
        // clock happens twice. 01:30 UTC is 02:30 CET, the second pass, so
        // 02:45 CEST (00:45 UTC) is gone and 02:45 CET is 15 minutes away.
        let now = Utc
            .with_ymd_and_hms(2024, 10, 27, 1, 30, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Europe::Berlin);
        let lines = scheduled(vec![line("F", "02:45", 1440)]);
        let rows = aggregate(&lines, &now).unwrap();
        assert_eq!(rows[0].next_departure.date, "2024-10-27");
        assert_eq!(rows[0].next_departure.time, "02:45");
        assert_eq!(rows[0].next_departure.remaining.as_deref(), Some("00:15:00"));
    }

    #[test]
    fn remaining_in_first_fall_back_hour_uses_earlier_instant() {
        // 00:30 UTC is 02:30 CEST, the first pass: 02:45 CEST is next.
        let now = Utc
            .with_ymd_and_hms(2024, 10, 27, 0, 30, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Europe::Berlin);
        let lines = scheduled(vec![line("F", "02:45", 1440)]);
        let rows = aggregate(&lines, &now).unwrap();
        assert_eq!(rows[0].next_departure.remaining.as_deref(), Some("00:15:00"));
    }

    #[test]
    fn remaining_formats_hours_beyond_a_day() {
        assert_eq!(format_remaining(TimeDelta::seconds(0)), "00:00:00");
        assert_eq!(format_remaining(TimeDelta::seconds(3_661)), "01:01:01");
        assert_eq!(format_remaining(TimeDelta::hours(25)), "25:00:00");
        assert_eq!(format_remaining(TimeDelta::milliseconds(1_999)), "00:00:01");
        assert_eq!(format_remaining(TimeDelta::seconds(-5)), "00:00:00");
    }

    #[test]
    fn empty_schedule_gives_empty_board() {
        assert!(aggregate(&[], &utc_at(12, 0, 0)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn board_reads_store_and_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 9, 2, 7, 0, 0).unwrap();
        let board = DepartureBoard::new(
            ScheduleStore::Static(vec![line("1", "08:00", 60), line("2", "07:10", 60)]),
            Clock::Fixed(instant),
            chrono_tz::UTC,
        );
        let rows = board.next_departures().await.unwrap();
        assert_eq!(numbers(&rows), ["2", "1"]);
        assert_eq!(rows[0].next_departure.remaining.as_deref(), Some("00:10:00"));
        assert_eq!(rows[1].next_departure.time, "08:00");
    }

    #[tokio::test]
    async fn board_surfaces_schedule_errors() {
        let board = DepartureBoard::new(
            ScheduleStore::Static(vec![line("1", "08:00", -5)]),
            Clock::System,
            chrono_tz::UTC,
        );
        let err = board.next_departures().await.unwrap_err();
        assert!(matches!(err, BoardError::Schedule(ScheduleError::InvalidLine { .. })));
    }
}
