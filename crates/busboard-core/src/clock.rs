//! Wall clock and time zone handling for the departure board.
//!
//! The board never reads ambient process time. A [`Clock`] is passed in
//! explicitly and produces "now" in the single configured zone, which keeps
//! the calculator and aggregator deterministic under test.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Errors that can occur while setting up the board clock.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The configured time zone is not a known IANA zone name.
    #[error("unknown time zone {zone:?}: {reason}")]
    UnknownZone {
        /// The rejected zone name.
        zone: String,
        /// Parser explanation.
        reason: String,
    },
}

/// Parse an IANA time zone name such as `UTC` or `Europe/Berlin`.
///
/// An unknown name is an error, never a fallback to UTC.
pub fn parse_zone(name: &str) -> Result<Tz, ClockError> {
    name.parse::<Tz>().map_err(|e| ClockError::UnknownZone {
        zone: name.to_owned(),
        reason: format!("{e}"),
    })
}

/// Source of the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// The system wall clock.
    #[default]
    System,
    /// A frozen instant, used by tests and replays.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Return the current instant in UTC.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(instant) => *instant,
        }
    }

    /// Return the current instant expressed in `zone`.
    pub fn now_in(&self, zone: Tz) -> DateTime<Tz> {
        self.now().with_timezone(&zone)
    }
}
