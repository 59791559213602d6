//! CLI command implementations

pub mod context;
pub mod delete;
pub mod download;
pub mod stat;
pub mod upload;
