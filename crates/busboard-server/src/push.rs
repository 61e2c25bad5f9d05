//! Per-subscriber push ticker.
//!
//! Every `WebSocket` subscriber gets its own ticker task that recomputes the
//! board once per [`AppState::push_interval`] and publishes the JSON payload
//! on a `watch` channel. The channel holds only the newest board, so a
//! connection that falls behind skips stale boards instead of queueing
//! them. The first payload is published immediately. A tick whose board computation fails is skipped and the
//! ticker keeps going; the ticker stops when the receiving side is gone or
//! when its [`TickerHandle`] is dropped.

use std::sync::Arc;
use std::time::Duration;

use busboard_core::{BoardError, DepartureBoard};
use busboard_types::SubscriberId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::state::{AppState, PUSH_INTERVAL};

/// Errors that can occur while rendering a push payload.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The board could not be computed.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// The board could not be serialized.
    #[error("failed to serialize departure board: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Compute the board and encode it as a JSON array.
///
/// # Errors
///
/// Returns [`PushError`] if the board cannot be computed or encoded.
pub async fn render_board(board: &DepartureBoard) -> Result<String, PushError> {
    let rows = board.next_departures().await?;
    Ok(serde_json::to_string(&rows)?)
}

/// Owner of a running ticker task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TickerHandle {
    subscriber: SubscriberId,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Whether the ticker task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!(subscriber = %self.subscriber, "push ticker cancelled");
    }
}

/// Start a ticker that pushes the board to `sink` every `period`.
///
/// A zero `period` falls back to [`PUSH_INTERVAL`].
pub fn spawn_ticker(
    state: Arc<AppState>,
    subscriber: SubscriberId,
    period: Duration,
    sink: watch::Sender<String>,
) -> TickerHandle {
    let period = if period.is_zero() {
        PUSH_INTERVAL
    } else {
        period
    };
    let task = tokio::spawn(run_ticker(state, subscriber, period, sink));
    TickerHandle { subscriber, task }
}

async fn run_ticker(
    state: Arc<AppState>,
    subscriber: SubscriberId,
    period: Duration,
    sink: watch::Sender<String>,
) {
    let mut interval = tokio::time::interval(period);
    // A slow cycle delays the next push rather than bursting to catch up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let payload = match render_board(&state.board).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(subscriber = %subscriber, error = %e, "push tick skipped");
                continue;
            }
        };

        if sink.send(payload).is_err() {
            debug!(subscriber = %subscriber, "push receiver closed, stopping ticker");
            return;
        }
    }
}
