//! HTTP service for the attendance tracker.
//!
//! Exposes the employee and admin views as a JSON API. Every request is
//! resolved to an optional principal by the [`Session`] extractor, and each
//! handler checks the capability it needs before touching storage.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod session;
pub mod views;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, AttendanceServer};
pub use session::Session;
pub use views::{AttendanceLog, DashboardView, DurationView, SignedIn, SummaryView};
