//! HTTP and push delivery for the busboard departure dashboard.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoint** (`GET /next-departure`) returning the current
//!   board as a JSON array, soonest departure first
//! - **`WebSocket` endpoint** (`/ws`) pushing the same board to each
//!   subscriber every second
//! - **Static browser client** served from the configured directory for
//!   every other path
//!
//! # Architecture
//!
//! Both delivery paths call [`DepartureBoard::next_departures`], which
//! re-reads the schedule on every call. Each push subscriber owns a
//! ticker task ([`push::spawn_ticker`]) and a registry entry
//! ([`subscribers::SubscriberRegistry`]); both are released when the
//! connection ends.
//!
//! [`DepartureBoard::next_departures`]: busboard_core::DepartureBoard::next_departures

pub mod error;
pub mod handlers;
pub mod push;
pub mod router;
pub mod server;
pub mod state;
pub mod subscribers;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind_listener, serve, start_server};
pub use state::{AppState, PUSH_INTERVAL};
pub use subscribers::{SubscriberGuard, SubscriberRegistry};
