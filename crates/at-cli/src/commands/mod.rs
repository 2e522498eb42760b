//! CLI command implementations.

pub mod employee;
pub mod init;
pub mod logs;
pub mod punch;
pub mod serve;
pub mod status;
pub mod util;
