//! Schedule store, departure calculator, and aggregator for busboard.
//!
//! This crate owns everything between the schedule file and the rows shown
//! on the dashboard. It has no HTTP dependencies; the server crate drives
//! it through [`DepartureBoard::next_departures`].
//!
//! # Modules
//!
//! - [`board`] -- Aggregation: sorting, formatting, and the
//!   [`DepartureBoard`] entry point.
//! - [`clock`] -- Explicit [`Clock`] and time zone parsing.
//! - [`config`] -- Configuration loading from `busboard.yaml` into
//!   strongly-typed structs.
//! - [`departure`] -- The next-departure calculator for daily repeating
//!   schedules.
//! - [`schedule`] -- Schedule store and batch validation.
//!
//! [`DepartureBoard`]: board::DepartureBoard
//! [`DepartureBoard::next_departures`]: board::DepartureBoard::next_departures
//! [`Clock`]: clock::Clock

pub mod board;
pub mod clock;
pub mod config;
pub mod departure;
pub mod schedule;

pub use board::{BoardError, DepartureBoard, aggregate};
pub use clock::{Clock, ClockError, parse_zone};
pub use config::{BoardConfig, ConfigError};
pub use departure::{DepartureAnchor, DepartureError, Frequency, LineError, LineSchedule, next_departure};
pub use schedule::{ScheduleError, ScheduleStore, ScheduledLine, parse_schedule};
