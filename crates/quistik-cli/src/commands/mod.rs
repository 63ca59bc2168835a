//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod job;
pub mod run;
pub mod save_account;
pub mod version;
