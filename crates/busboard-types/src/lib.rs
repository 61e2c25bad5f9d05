//! Shared type definitions for the busboard departure dashboard.
//!
//! Types defined here are used by both the schedule core and the HTTP
//! server, and flow downstream to `TypeScript` via `ts-rs` for the browser
//! client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for push subscriber identities
//! - [`schedule`] -- Schedule records and formatted departure rows

pub mod ids;
pub mod schedule;

// Re-export all public types at crate root for convenience.
pub use ids::SubscriberId;
pub use schedule::{BusLine, DepartureResult, FormattedDeparture};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard client.

    #[test]
    fn export_bindings() {
        // Files are written to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        let _ = crate::ids::SubscriberId::export_all();

        let _ = crate::schedule::BusLine::export_all();
        let _ = crate::schedule::FormattedDeparture::export_all();
        let _ = crate::schedule::DepartureResult::export_all();
    }
}
