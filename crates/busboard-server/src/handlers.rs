//! REST endpoint handlers for the busboard API.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use busboard_types::DepartureResult;

use crate::error::ApiError;
use crate::state::AppState;

/// Return the next departure of every line, soonest first.
///
/// # Route
///
/// `GET /next-departure`
///
/// # Errors
///
/// Returns [`ApiError`] if the schedule cannot be loaded or a departure
/// cannot be computed.
pub async fn next_departure(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DepartureResult>>, ApiError> {
    let rows = state.board.next_departures().await?;
    Ok(Json(rows))
}
