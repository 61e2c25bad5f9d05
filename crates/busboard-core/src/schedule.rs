//! Schedule store: loading and validating bus line records.
//!
//! The store is re-read on every computation cycle; nothing is cached.
//! Records are validated as a batch. A single record with a bad anchor or
//! frequency rejects the whole load, so the board never shows a partial
//! timetable.

use std::path::{Path, PathBuf};

use busboard_types::BusLine;
use tracing::debug;

use crate::departure::{LineError, LineSchedule};

/// Errors that can occur while loading the schedule.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The schedule source could not be read.
    #[error("failed to read schedule from {}: {source}", path.display())]
    Read {
        /// Location of the schedule source.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The source is not a JSON list of bus line records.
    #[error("schedule is not a valid list of bus lines: {source}")]
    Malformed {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A record has an invalid anchor time or frequency.
    #[error("invalid schedule entry #{index} (bus {bus_number}): {source}")]
    InvalidLine {
        /// Zero-based position of the record in the source.
        index: usize,
        /// Line number of the offending record.
        bus_number: String,
        /// What is wrong with the record.
        source: LineError,
    },
}

impl ScheduleError {
    /// Whether the source itself was unavailable or unreadable, as opposed
    /// to containing an invalid record.
    pub const fn is_load_failure(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Malformed { .. })
    }
}

/// A bus line record together with its validated schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledLine {
    /// The record as loaded, passed through to the output.
    pub line: BusLine,
    /// The parsed anchor and frequency.
    pub schedule: LineSchedule,
}

impl ScheduledLine {
    /// Validate a raw record.
    pub fn from_line(line: BusLine) -> Result<Self, LineError> {
        let schedule = LineSchedule::parse(&line.first_departure_time, line.frequency_minutes)?;
        Ok(Self { line, schedule })
    }
}

/// Validate every record, keeping input order.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidLine`] for the first invalid record.
pub fn validate_lines(lines: Vec<BusLine>) -> Result<Vec<ScheduledLine>, ScheduleError> {
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let bus_number = line.bus_number.clone();
            ScheduledLine::from_line(line).map_err(|source| ScheduleError::InvalidLine {
                index,
                bus_number,
                source,
            })
        })
        .collect()
}

/// Parse and validate a JSON array of bus line records.
///
/// # Errors
///
/// Returns [`ScheduleError::Malformed`] if the JSON does not match the
/// record shape, or [`ScheduleError::InvalidLine`] if any record fails
/// validation.
pub fn parse_schedule(json: &str) -> Result<Vec<ScheduledLine>, ScheduleError> {
    let lines: Vec<BusLine> = serde_json::from_str(json)?;
    validate_lines(lines)
}

/// Where the schedule is read from.
///
/// Uses enum dispatch rather than a trait object so that [`load`] can stay
/// an inherent `async fn`.
///
/// [`load`]: ScheduleStore::load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleStore {
    /// A JSON file, re-read on every load.
    File(PathBuf),
    /// A fixed in-memory list.
    Static(Vec<BusLine>),
}

impl ScheduleStore {
    /// Create a store backed by a JSON file.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Load and validate the current schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the source is unreadable, malformed,
    /// or contains an invalid record.
    pub async fn load(&self) -> Result<Vec<ScheduledLine>, ScheduleError> {
        match self {
            Self::File(path) => {
                let contents = tokio::fs::read_to_string(path).await.map_err(|source| {
                    ScheduleError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                let lines = parse_schedule(&contents)?;
                debug!(path = %path.display(), lines = lines.len(), "schedule loaded");
                Ok(lines)
            }
            Self::Static(lines) => validate_lines(lines.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const VALID: &str = r#"[
        {"busNumber": "1", "startPoint": "Depot", "endPoint": "Harbor",
         "firstDepartureTime": "06:00", "frequencyMinutes": 15},
        {"busNumber": "2", "startPoint": "Harbor", "endPoint": "Depot",
         "firstDepartureTime": "06:30", "frequencyMinutes": 40}
    ]"#;

    fn line(bus_number: &str, first_departure_time: &str, frequency_minutes: i64) -> BusLine {
        BusLine {
            bus_number: bus_number.to_owned(),
            start_point: String::from("A"),
            end_point: String::from("B"),
            first_departure_time: first_departure_time.to_owned(),
            frequency_minutes,
        }
    }

    #[test]
    fn parses_valid_schedule_in_order() {
        let lines = parse_schedule(VALID).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line.bus_number, "1");
        assert_eq!(lines[1].line.bus_number, "2");
        assert_eq!(lines[1].schedule.frequency.minutes(), 40);
        assert_eq!(lines[1].schedule.anchor.to_string(), "06:30");
    }

    #[test]
    fn empty_list_is_valid() {
        assert!(parse_schedule("[]").unwrap().is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_schedule("not json").unwrap_err();
        assert!(matches!(err, ScheduleError::Malformed { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = parse_schedule(r#"{"busNumber": "1"}"#).unwrap_err();
        assert!(matches!(err, ScheduleError::Malformed { .. }));

        let err = parse_schedule(r#"[{"busNumber": "1", "startPoint": "A"}]"#).unwrap_err();
        assert!(matches!(err, ScheduleError::Malformed { .. }));
    }

    #[test]
    fn invalid_time_rejects_whole_batch() {
        let err = validate_lines(vec![line("1", "06:00", 10), line("2", "6am", 10)]).unwrap_err();
        match err {
            ScheduleError::InvalidLine {
                index,
                bus_number,
                source,
            } => {
                assert_eq!(index, 1);
                assert_eq!(bus_number, "2");
                assert!(matches!(source, LineError::InvalidTime { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_frequency_rejects_whole_batch() {
        let err = validate_lines(vec![line("7", "06:00", 0)]).unwrap_err();
        assert!(!err.is_load_failure());
        assert!(matches!(
            err,
            ScheduleError::InvalidLine {
                source: LineError::NonPositiveFrequency { minutes: 0 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn static_store_validates_on_load() {
        let store = ScheduleStore::Static(vec![line("1", "05:00", 20)]);
        assert_eq!(store.load().await.unwrap().len(), 1);

        let store = ScheduleStore::Static(vec![line("1", "25:00", 20)]);
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join(format!("busboard-missing-{}.json", uuid::Uuid::now_v7()));
        let store = ScheduleStore::file(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, ScheduleError::Read { .. }));
        assert!(err.is_load_failure());
        assert!(err.to_string().contains("busboard-missing-"));
    }

    #[tokio::test]
    async fn file_store_rereads_on_every_load() {
        let path = std::env::temp_dir().join(format!("busboard-reload-{}.json", uuid::Uuid::now_v7()));
        tokio::fs::write(&path, VALID).await.unwrap();
        let store = ScheduleStore::file(&path);
        assert_eq!(store.load().await.unwrap().len(), 2);

        tokio::fs::write(&path, "[]").await.unwrap();
        assert!(store.load().await.unwrap().is_empty());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn project_schedule_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("buses.json");
        if path.exists() {
            let lines = ScheduleStore::file(&path).load().await;
            assert!(lines.is_ok(), "Failed to load project schedule: {lines:?}");
        }
    }
}
