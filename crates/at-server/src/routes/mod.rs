//! Route handlers.

pub mod admin;
pub mod attendance;
pub mod auth;
