//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the document datastore holding users and daily logs). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

mod daily_log_repository;
mod user_repository;

#[cfg(test)]
pub use daily_log_repository::MockDailyLogRepository;
pub use daily_log_repository::{DailyLogRepository, DailyLogRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
