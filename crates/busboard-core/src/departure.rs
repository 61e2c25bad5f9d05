//! Next-departure calculation for daily repeating schedules.
//!
//! A line departs at its anchor time every day and then every `frequency`
//! minutes until the end of that calendar day. The sequence does not carry
//! across midnight: the next day starts over at the anchor. When the
//! frequency does not divide the rest of the day evenly this leaves a gap
//! between the last departure of one day and the anchor of the next, and
//! that gap is part of the schedule.
//!
//! All arithmetic here works on wall-clock time ([`NaiveDateTime`]) in the
//! board's configured zone. Converting to and from real instants is the
//! aggregator's job.

use core::fmt;
use core::num::NonZeroU32;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Maximum number of digits accepted for either side of `HH:MM`.
const MAX_COMPONENT_DIGITS: usize = 2;

/// Errors found while validating a single schedule record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// The first departure time is not a valid `HH:MM` time of day.
    #[error("invalid first departure time {value:?}: expected HH:MM")]
    InvalidTime {
        /// The rejected value as it appeared in the source.
        value: String,
    },

    /// The frequency is zero or negative.
    #[error("frequency must be a positive number of minutes, got {minutes}")]
    NonPositiveFrequency {
        /// The rejected frequency.
        minutes: i64,
    },

    /// The frequency does not fit the supported range.
    #[error("frequency of {minutes} minutes is out of range")]
    FrequencyOutOfRange {
        /// The rejected frequency.
        minutes: i64,
    },
}

/// Errors that can occur while computing a departure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DepartureError {
    /// The next departure falls outside the representable calendar.
    #[error("next departure is outside the representable date range")]
    OutOfRange,
}

/// Daily time of day at which a line's schedule starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepartureAnchor(NaiveTime);

impl DepartureAnchor {
    /// Build an anchor from an hour (0-23) and minute (0-59).
    ///
    /// Returns `None` if either component is out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse an anchor from its `HH:MM` schedule form.
    ///
    /// Hours and minutes may have one or two ASCII digits. Anything else,
    /// including surrounding whitespace or seconds, is rejected.
    pub fn parse(value: &str) -> Result<Self, LineError> {
        let invalid = || LineError::InvalidTime {
            value: value.to_owned(),
        };

        let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
        let hour = parse_component(hour).ok_or_else(invalid)?;
        let minute = parse_component(minute).ok_or_else(invalid)?;

        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    /// Return the anchor as a time of day.
    pub const fn time(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for DepartureAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Parse one numeric side of an `HH:MM` string.
fn parse_component(raw: &str) -> Option<u32> {
    if raw.is_empty()
        || raw.len() > MAX_COMPONENT_DIGITS
        || !raw.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    raw.parse().ok()
}

/// Minutes between consecutive departures of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(NonZeroU32);

impl Frequency {
    /// Validate a frequency read from the schedule source.
    pub fn from_minutes(minutes: i64) -> Result<Self, LineError> {
        if minutes <= 0 {
            return Err(LineError::NonPositiveFrequency { minutes });
        }
        let minutes_u32 =
            u32::try_from(minutes).map_err(|_err| LineError::FrequencyOutOfRange { minutes })?;
        NonZeroU32::new(minutes_u32)
            .map(Self)
            .ok_or(LineError::NonPositiveFrequency { minutes })
    }

    /// Return the frequency in minutes.
    pub const fn minutes(self) -> u32 {
        self.0.get()
    }

    /// Return the frequency as a time step.
    fn step(self) -> Result<TimeDelta, DepartureError> {
        TimeDelta::try_minutes(i64::from(self.minutes())).ok_or(DepartureError::OutOfRange)
    }
}

/// A validated daily schedule: anchor plus frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSchedule {
    /// First departure of every day.
    pub anchor: DepartureAnchor,
    /// Minutes between departures within a day.
    pub frequency: Frequency,
}

impl LineSchedule {
    /// Create a schedule from already validated parts.
    pub const fn new(anchor: DepartureAnchor, frequency: Frequency) -> Self {
        Self { anchor, frequency }
    }

    /// Validate the raw schedule fields of a bus line record.
    pub fn parse(first_departure_time: &str, frequency_minutes: i64) -> Result<Self, LineError> {
        Ok(Self::new(
            DepartureAnchor::parse(first_departure_time)?,
            Frequency::from_minutes(frequency_minutes)?,
        ))
    }
}

/// Compute the first departure at or after `now`.
///
/// Starts from today's anchor and steps forward by the frequency. A step
/// that crosses midnight is discarded and the schedule restarts at the
/// anchor on the next day, which is always later than `now`. A departure
/// exactly at `now` counts as the next one.
///
/// # Errors
///
/// Returns [`DepartureError::OutOfRange`] if the computation would leave
/// the calendar range supported by `chrono`.
pub fn next_departure(
    now: NaiveDateTime,
    schedule: &LineSchedule,
) -> Result<NaiveDateTime, DepartureError> {
    let step = schedule.frequency.step()?;
    let anchor = schedule.anchor.time();

    let today = now.date();
    let tomorrow = today.succ_opt().ok_or(DepartureError::OutOfRange)?;
    let day_end = tomorrow
        .and_hms_opt(0, 0, 0)
        .ok_or(DepartureError::OutOfRange)?;
    let restart = tomorrow.and_time(anchor);

    let mut departure = today.and_time(anchor);
    while departure < now {
        departure = departure
            .checked_add_signed(step)
            .ok_or(DepartureError::OutOfRange)?;
        if departure >= day_end {
            departure = restart;
        }
    }

    Ok(departure)
}
