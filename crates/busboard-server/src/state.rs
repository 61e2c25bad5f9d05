//! Shared application state for the busboard server.
//!
//! [`AppState`] is built once at startup and shared behind an [`Arc`] by
//! the HTTP handlers and every push subscriber.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use busboard_core::DepartureBoard;

use crate::subscribers::SubscriberRegistry;

/// How often each push subscriber receives a fresh board.
pub const PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// State shared by all request handlers and push tickers.
#[derive(Debug)]
pub struct AppState {
    /// The departure board every delivery path reads from.
    pub board: DepartureBoard,
    /// Currently connected push subscribers.
    pub subscribers: Arc<SubscriberRegistry>,
    /// Directory of the browser client assets.
    pub static_dir: PathBuf,
    /// Period between pushes to a subscriber.
    pub push_interval: Duration,
}

impl AppState {
    /// Create state for `board`, serving client assets from `static_dir`.
    pub fn new(board: DepartureBoard, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            board,
            subscribers: Arc::new(SubscriberRegistry::new()),
            static_dir: static_dir.into(),
            push_interval: PUSH_INTERVAL,
        }
    }

    /// Replace the push period. Only tests shorten it.
    #[must_use]
    pub fn with_push_interval(mut self, push_interval: Duration) -> Self {
        self.push_interval = push_interval;
        self
    }
}
