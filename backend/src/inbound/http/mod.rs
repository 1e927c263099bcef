//! HTTP inbound adapter exposing the REST API.

pub mod accounts;
pub mod analytics;
pub mod daily_logs;
pub mod error;
pub mod export;
pub mod factories;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
